//! Image asset store.
//!
//! Paths are queued up front, loaded together in one batch, and read back by
//! path once the batch is done. A failed load still counts toward finishing
//! the batch. It just isn't retried, and looking it up is an error.
use crate::engine;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::rc::Rc;
use web_sys::HtmlImageElement;

#[async_trait(?Send)]
pub trait ImageLoader {
    type Image;
    async fn load(&self, path: &str) -> Result<Self::Image>;
}

/// Loads through an `<img>` element, see [`engine::load_image`]
pub struct HtmlImageLoader;

#[async_trait(?Send)]
impl ImageLoader for HtmlImageLoader {
    type Image = HtmlImageElement;

    async fn load(&self, path: &str) -> Result<HtmlImageElement> {
        engine::load_image(path).await
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub success: usize,
    pub error: usize,
}

enum Slot<I> {
    Loaded(Rc<I>),
    Failed(String),
}

pub struct AssetStore<I> {
    download_queue: Vec<String>,
    cache: HashMap<String, Slot<I>>,
    report: LoadReport,
}

impl<I> Default for AssetStore<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> AssetStore<I> {
    pub fn new() -> Self {
        AssetStore {
            download_queue: Vec::new(),
            cache: HashMap::new(),
            report: LoadReport::default(),
        }
    }

    /// Duplicates are fine, each one is loaded and counted.
    pub fn queue(&mut self, path: impl Into<String>) {
        let path = path.into();
        log::debug!("queued {}", path);
        self.download_queue.push(path);
    }

    pub fn queued(&self) -> usize {
        self.download_queue.len()
    }

    pub fn is_done(&self) -> bool {
        self.download_queue.len() == self.report.success + self.report.error
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }

    /// Starts every queued load at once and resolves after the last one has
    /// succeeded or failed. Nothing runs until the returned future is polled,
    /// so even an empty queue completes asynchronously.
    pub async fn load_all<L>(&mut self, loader: &L) -> LoadReport
    where
        L: ImageLoader<Image = I>,
    {
        let loads = self.download_queue.iter().map(|path| async move {
            let result = loader.load(path).await;
            (path.clone(), result)
        });
        let results = join_all(loads).await;

        self.report = LoadReport::default();
        for (path, result) in results {
            let slot = match result {
                Ok(image) => {
                    log::debug!("loaded {}", path);
                    self.report.success += 1;
                    Slot::Loaded(Rc::new(image))
                }
                Err(err) => {
                    log::warn!("failed to load {} : {:#}", path, err);
                    self.report.error += 1;
                    Slot::Failed(format!("{:#}", err))
                }
            };
            self.cache.insert(path, slot);
        }

        log::info!(
            "assets loaded : {} ok, {} failed",
            self.report.success,
            self.report.error
        );
        self.report
    }

    pub fn get(&self, path: &str) -> Result<Rc<I>> {
        match self.cache.get(path) {
            Some(Slot::Loaded(image)) => Ok(image.clone()),
            Some(Slot::Failed(reason)) => Err(anyhow!("Asset {} failed to load : {}", path, reason)),
            None => Err(anyhow!("Asset {} was never loaded", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::FakeSheet;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};

    /// Serves a fixed sheet for every path except the ones marked missing.
    #[derive(Default)]
    struct StubLoader {
        missing: Vec<&'static str>,
        requested: RefCell<Vec<String>>,
    }

    #[async_trait(?Send)]
    impl ImageLoader for StubLoader {
        type Image = FakeSheet;

        async fn load(&self, path: &str) -> Result<FakeSheet> {
            self.requested.borrow_mut().push(path.to_string());
            if self.missing.iter().any(|missing| *missing == path) {
                Err(anyhow!("404 {}", path))
            } else {
                Ok(FakeSheet {
                    width: 400.0,
                    height: 200.0,
                })
            }
        }
    }

    #[test]
    fn empty_queue_completes_only_when_awaited() {
        let mut store = AssetStore::<FakeSheet>::new();
        let loader = StubLoader::default();
        let fired = Cell::new(false);

        let pending = async {
            let report = store.load_all(&loader).await;
            fired.set(true);
            report
        };
        assert!(!fired.get());

        let report = block_on(pending);
        assert!(fired.get());
        assert_eq!(report, LoadReport { success: 0, error: 0 });
        assert!(store.is_done());
    }

    #[test]
    fn failures_count_toward_done() {
        let mut store = AssetStore::new();
        store.queue("images/a.png");
        store.queue("images/gone.png");
        store.queue("images/b.png");
        assert_eq!(store.queued(), 3);
        assert!(!store.is_done());
        assert_eq!(store.report(), LoadReport::default());

        let loader = StubLoader {
            missing: vec!["images/gone.png"],
            ..StubLoader::default()
        };
        let report = block_on(store.load_all(&loader));

        assert_eq!(report, LoadReport { success: 2, error: 1 });
        assert_eq!(store.report(), report);
        assert!(store.is_done());
        assert_eq!(loader.requested.borrow().len(), 3);
    }

    #[test]
    fn get_returns_loaded_images_and_errors_otherwise() {
        let mut store = AssetStore::new();
        store.queue("images/a.png");
        store.queue("images/gone.png");
        let loader = StubLoader {
            missing: vec!["images/gone.png"],
            ..StubLoader::default()
        };
        block_on(store.load_all(&loader));

        let sheet = store.get("images/a.png").unwrap();
        assert_eq!(sheet.width, 400.0);

        let failed = store.get("images/gone.png").unwrap_err().to_string();
        assert!(failed.contains("failed to load"), "{}", failed);

        let unknown = store.get("images/never.png").unwrap_err().to_string();
        assert!(unknown.contains("never loaded"), "{}", unknown);
    }

    #[test]
    fn duplicate_paths_are_each_counted() {
        let mut store = AssetStore::new();
        store.queue("images/a.png");
        store.queue("images/a.png");
        let report = block_on(store.load_all(&StubLoader::default()));
        assert_eq!(report.success, 2);
        assert!(store.is_done());
        assert!(store.get("images/a.png").is_ok());
    }
}
