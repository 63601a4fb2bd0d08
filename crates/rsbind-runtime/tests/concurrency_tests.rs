//! Concurrency tests for the callback registry
//!
//! Host threads register, invoke and release callbacks at the same time;
//! handles must stay unique and no dispatch may observe a half-updated map.

use rsbind_runtime::CallbackRegistry;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

trait Listener: Send + Sync {
    fn on_event(&self);
}

#[derive(Default)]
struct CountingListener {
    events: AtomicU64,
}

impl Listener for CountingListener {
    fn on_event(&self) {
        self.events.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn test_concurrent_registration_yields_unique_handles() {
    let registry: Arc<CallbackRegistry<dyn Listener>> = Arc::new(CallbackRegistry::new());
    let num_threads = 16;
    let per_thread = 100;
    let barrier = Arc::new(Barrier::new(num_threads));

    let workers: Vec<_> = (0..num_threads)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..per_thread)
                    .map(|_| registry.register(Arc::new(CountingListener::default())))
                    .collect::<Vec<u64>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for worker in workers {
        for handle in worker.join().unwrap() {
            assert!(seen.insert(handle), "handle {handle} issued twice");
        }
    }

    assert_eq!(seen.len(), num_threads * per_thread);
    assert_eq!(registry.len(), num_threads * per_thread);
    assert!(!seen.contains(&0));
}

#[test]
fn test_concurrent_invoke_on_shared_callback() {
    let registry: Arc<CallbackRegistry<dyn Listener>> = Arc::new(CallbackRegistry::new());
    let listener = Arc::new(CountingListener::default());
    let handle = registry.register(listener.clone());
    let num_threads = 8;
    let per_thread = 500;
    let barrier = Arc::new(Barrier::new(num_threads));

    let workers: Vec<_> = (0..num_threads)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..per_thread {
                    registry.invoke(handle, |l| l.on_event());
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(
        listener.events.load(Ordering::Relaxed),
        (num_threads * per_thread) as u64
    );
}

#[test]
fn test_concurrent_register_and_remove_leaves_registry_empty() {
    let registry: Arc<CallbackRegistry<dyn Listener>> = Arc::new(CallbackRegistry::new());
    let num_threads = 12;
    let barrier = Arc::new(Barrier::new(num_threads));

    let workers: Vec<_> = (0..num_threads)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..200 {
                    let handle = registry.register(Arc::new(CountingListener::default()));
                    registry.invoke(handle, |l| l.on_event());
                    assert!(registry.remove(handle).is_some());
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert!(registry.is_empty());
}

#[test]
fn test_release_races_with_lookup() {
    let registry: Arc<CallbackRegistry<dyn Listener>> = Arc::new(CallbackRegistry::new());
    let handles: Vec<u64> = (0..1_000)
        .map(|_| registry.register(Arc::new(CountingListener::default())))
        .collect();
    let handles = Arc::new(handles);
    let barrier = Arc::new(Barrier::new(2));

    let remover = {
        let registry = registry.clone();
        let handles = handles.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            barrier.wait();
            for handle in handles.iter() {
                registry.remove(*handle);
            }
        })
    };

    let reader = {
        let registry = registry.clone();
        let handles = handles.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            barrier.wait();
            for handle in handles.iter() {
                // Either still live or cleanly gone.
                let _ = registry.try_invoke(*handle, |l| l.on_event());
            }
        })
    };

    remover.join().unwrap();
    reader.join().unwrap();

    assert!(registry.is_empty());
}
