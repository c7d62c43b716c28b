//! Tests for the pending update queue.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::super::queue::{PendingUpdate, PendingUpdateQueue};

    #[test]
    fn test_drain_returns_fifo_and_empties() {
        let queue = PendingUpdateQueue::new();
        queue.push(PendingUpdate::new("a", "1"));
        queue.push(PendingUpdate::new("b", "2"));
        queue.push(PendingUpdate::new("a", "3"));

        assert_eq!(queue.len(), 3);
        let drained = queue.drain_all();
        assert_eq!(
            drained,
            vec![
                PendingUpdate::new("a", "1"),
                PendingUpdate::new("b", "2"),
                PendingUpdate::new("a", "3"),
            ]
        );
        assert!(queue.is_empty());
        assert!(queue.drain_all().is_empty());
    }

    #[test]
    fn test_lock_allows_inspection_and_mutation() {
        let queue = PendingUpdateQueue::new();
        queue.push(PendingUpdate::new("a", "1"));
        queue.push(PendingUpdate::new("b", "2"));

        {
            let mut staged = queue.lock();
            assert_eq!(staged.len(), 2);
            staged.retain(|u| u.key != "a");
        }

        assert_eq!(queue.snapshot(), vec![PendingUpdate::new("b", "2")]);
    }

    #[test]
    fn test_concurrent_push_and_drain_neither_lose_nor_duplicate() {
        const PRODUCERS: usize = 4;
        const PER_PRODUCER: usize = 5_000;

        let queue = Arc::new(PendingUpdateQueue::new());
        let done = Arc::new(AtomicBool::new(false));
        let mut seen: Vec<PendingUpdate> = std::thread::scope(|scope| {
            let mut producers = Vec::new();
            for p in 0..PRODUCERS {
                let queue = queue.clone();
                producers.push(scope.spawn(move || {
                    for i in 0..PER_PRODUCER {
                        queue.push(PendingUpdate::new(format!("p{}", p), i.to_string()));
                    }
                }));
            }

            let drainer = {
                let queue = queue.clone();
                let done = done.clone();
                scope.spawn(move || {
                    let mut out = Vec::new();
                    while !done.load(Ordering::Acquire) {
                        out.extend(queue.drain_all());
                        std::thread::yield_now();
                    }
                    out
                })
            };

            for producer in producers {
                producer.join().expect("producer panicked");
            }
            done.store(true, Ordering::Release);
            drainer.join().expect("drainer panicked")
        });
        seen.extend(queue.drain_all());

        assert_eq!(seen.len(), PRODUCERS * PER_PRODUCER);
        let unique: HashSet<(String, String)> = seen
            .iter()
            .map(|u| (u.key.clone(), u.value.clone()))
            .collect();
        assert_eq!(unique.len(), seen.len(), "no update may be drained twice");

        // Per-producer order survives draining
        for p in 0..PRODUCERS {
            let key = format!("p{}", p);
            let values: Vec<usize> = seen
                .iter()
                .filter(|u| u.key == key)
                .map(|u| u.value.parse().expect("numeric value"))
                .collect();
            assert!(values.windows(2).all(|w| w[0] < w[1]), "producer {} reordered", p);
        }
    }
}
