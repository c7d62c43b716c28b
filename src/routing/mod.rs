//! Key -> worker routing strategies.

pub mod router;


pub use router::{new_router, KeyRouter, PrefixRouter, Route, TableRouter};
