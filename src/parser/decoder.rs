// Payload decoders turning parser callbacks into pending updates.

use std::collections::HashSet;

use crate::config::Callbacks;
use crate::db::PendingUpdate;
use crate::manager::CacheError;

use super::CallbackMessage;

/// Strategy deciding whether a callback carries an update and extracting it.
pub trait PayloadDecoder: Send + Sync {
    /// Returns the update, or the reason the message must be ignored.
    fn decode(&self, msg: &CallbackMessage) -> Result<PendingUpdate, CacheError>;
}

/// Accepts a fixed set of msgtypes whose payload is `<key><sep><value>`.
///
/// The payload is split at the first separator, so values may contain it.
#[derive(Debug, Clone)]
pub struct DelimitedDecoder {
    update_types: HashSet<i32>,
    separator: String,
}

impl DelimitedDecoder {
    pub fn new(update_types: impl IntoIterator<Item = i32>, separator: impl Into<String>) -> Self {
        Self {
            update_types: update_types.into_iter().collect(),
            separator: separator.into(),
        }
    }

    pub fn from_config(cfg: &Callbacks) -> Self {
        Self::new(cfg.update_types.iter().copied(), cfg.separator.clone())
    }
}

impl PayloadDecoder for DelimitedDecoder {
    fn decode(&self, msg: &CallbackMessage) -> Result<PendingUpdate, CacheError> {
        if !self.update_types.contains(&msg.msgtype) {
            return Err(CacheError::UnrecognizedCallback(msg.msgtype));
        }

        match msg.payload.split_once(self.separator.as_str()) {
            Some((key, value)) if !key.is_empty() => Ok(PendingUpdate::new(key, value)),
            _ => Err(CacheError::MalformedPayload {
                msgtype: msg.msgtype,
                payload: msg.payload.clone(),
            }),
        }
    }
}
