//! Photo loading and caching port definitions.

use bytes::Bytes;
use reqwest::Url;

use crate::domain::errors::PhotoError;
use crate::domain::task::{Completion, LoadTask};

/// Port for loading photo bytes by URL.
pub trait PhotoLoader: Send + Sync {
    /// Starts loading `url`. The completion fires at most once, and never
    /// after the returned task has been cancelled.
    fn load(&self, url: &Url, completion: Completion<Bytes, PhotoError>) -> Box<dyn LoadTask>;
}

/// Port for persisting photo bytes by URL.
pub trait PhotoCache: Send + Sync {
    /// Saves `data` for `url`.
    fn save(&self, data: Bytes, url: &Url, completion: Completion<(), PhotoError>);
}

impl<T: PhotoLoader + ?Sized> PhotoLoader for std::sync::Arc<T> {
    fn load(&self, url: &Url, completion: Completion<Bytes, PhotoError>) -> Box<dyn LoadTask> {
        (**self).load(url, completion)
    }
}

impl<T: PhotoCache + ?Sized> PhotoCache for std::sync::Arc<T> {
    fn save(&self, data: Bytes, url: &Url, completion: Completion<(), PhotoError>) {
        (**self).save(data, url, completion);
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Load {
        url: Url,
        completion: Option<Completion<Bytes, PhotoError>>,
    }

    /// Records loads and lets tests complete each one once, by index.
    #[derive(Default)]
    pub struct PhotoLoaderSpy {
        loads: Mutex<Vec<Load>>,
        cancelled: Arc<Mutex<Vec<Url>>>,
    }

    struct SpyTask {
        url: Url,
        cancelled: Arc<Mutex<Vec<Url>>>,
    }

    impl LoadTask for SpyTask {
        fn cancel(&self) {
            self.cancelled.lock().push(self.url.clone());
        }
    }

    impl PhotoLoaderSpy {
        /// Creates an empty spy.
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// URLs loaded so far.
        pub fn loaded_urls(&self) -> Vec<Url> {
            self.loads.lock().iter().map(|l| l.url.clone()).collect()
        }

        /// URLs whose tasks were cancelled.
        pub fn cancelled_urls(&self) -> Vec<Url> {
            self.cancelled.lock().clone()
        }

        /// Delivers `result` to the load at `index`.
        pub fn complete(&self, index: usize, result: Result<Bytes, PhotoError>) {
            let completion = self
                .loads
                .lock()
                .get_mut(index)
                .and_then(|l| l.completion.take());
            if let Some(completion) = completion {
                completion(result);
            }
        }
    }

    impl PhotoLoader for PhotoLoaderSpy {
        fn load(
            &self,
            url: &Url,
            completion: Completion<Bytes, PhotoError>,
        ) -> Box<dyn LoadTask> {
            self.loads.lock().push(Load {
                url: url.clone(),
                completion: Some(completion),
            });
            Box::new(SpyTask {
                url: url.clone(),
                cancelled: Arc::clone(&self.cancelled),
            })
        }
    }

    /// Records saves and answers them immediately with a preset result.
    pub struct PhotoCacheSpy {
        saves: Mutex<Vec<(Bytes, Url)>>,
        result: Result<(), PhotoError>,
    }

    impl PhotoCacheSpy {
        /// Spy whose saves succeed.
        pub fn new() -> Arc<Self> {
            Self::with_result(Ok(()))
        }

        /// Spy whose saves complete with `result`.
        pub fn with_result(result: Result<(), PhotoError>) -> Arc<Self> {
            Arc::new(Self {
                saves: Mutex::new(Vec::new()),
                result,
            })
        }

        /// Saves received so far.
        pub fn saves(&self) -> Vec<(Bytes, Url)> {
            self.saves.lock().clone()
        }
    }

    impl PhotoCache for PhotoCacheSpy {
        fn save(&self, data: Bytes, url: &Url, completion: Completion<(), PhotoError>) {
            self.saves.lock().push((data, url.clone()));
            completion(self.result.clone());
        }
    }
}
