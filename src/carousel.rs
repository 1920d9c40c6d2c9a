//! Solution video carousel shown above the solutions tab.
//!
//! [`Carousel`] is the pure cycling state. A [`CarouselHost`] owns the page
//! side: it knows whether a carousel is already on the page and how to mount
//! one. [`add_video`] ties both to the cached dataset.

use crate::cache::Storage;
use crate::config::KEY_PROBLEMS;
use crate::{ExtensionError, ProblemDataset, Video};
use log::{debug, info};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Ordered videos of one problem plus the index on display.
#[derive(Debug, Clone, PartialEq)]
pub struct Carousel {
    videos: Vec<Video>,
    current: usize,
}

impl Carousel {
    /// `None` for an empty list: nothing to show, nothing to wire.
    pub fn new(videos: Vec<Video>) -> Option<Self> {
        if videos.is_empty() {
            return None;
        }
        Some(Self { videos, current: 0 })
    }

    /// Step one video back or forward, wrapping at both ends.
    pub fn advance(&mut self, direction: Direction) -> &Video {
        let n = self.videos.len();
        self.current = match direction {
            Direction::Prev => (self.current + n - 1) % n,
            Direction::Next => (self.current + 1) % n,
        };
        &self.videos[self.current]
    }

    pub fn current(&self) -> &Video {
        &self.videos[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

/// Elements showing the current video: embed source and channel label.
pub trait VideoView {
    fn show(&self, video: &Video);
}

/// Move `carousel` one step and show the video it lands on.
pub fn step<V: VideoView + ?Sized>(carousel: &RefCell<Carousel>, view: &V, direction: Direction) {
    view.show(carousel.borrow_mut().advance(direction));
}

/// Page surface a carousel can be mounted on.
pub trait CarouselHost {
    type Handle;

    /// Whether the page already shows a carousel.
    fn has_carousel(&self) -> bool;

    fn mount(&self, carousel: Carousel) -> Result<Self::Handle, ExtensionError>;
}

/// Show the videos of `title` on `host`, at most once per page.
///
/// Returns the new handle, or `None` when a carousel already exists or the
/// problem has no cached videos.
pub async fn add_video<S, H>(host: &H, storage: &S, title: &str) -> Result<Option<H::Handle>, ExtensionError>
where
    S: Storage,
    H: CarouselHost,
{
    if host.has_carousel() {
        debug!("Carousel already present for {}", title);
        return Ok(None);
    }

    let Some(dataset) = storage.get::<ProblemDataset>(KEY_PROBLEMS).await? else {
        debug!("No cached dataset");
        return Ok(None);
    };
    let Some(problem) = dataset.find(title) else {
        debug!("No cached problem titled {}", title);
        return Ok(None);
    };
    let Some(carousel) = Carousel::new(problem.videos.clone()) else {
        debug!("{} has no videos", title);
        return Ok(None);
    };

    // Another addVideo may have mounted while the dataset was loading.
    if host.has_carousel() {
        return Ok(None);
    }

    info!("Showing {} videos for {}", carousel.len(), title);
    host.mount(carousel).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStorage;
    use crate::Question;
    use futures::executor::block_on;
    use std::cell::Cell;

    #[derive(Default)]
    struct RecordingView {
        shown: RefCell<Vec<(String, String)>>,
    }

    impl VideoView for RecordingView {
        fn show(&self, video: &Video) {
            self.shown
                .borrow_mut()
                .push((video.embedded_url.clone(), video.channel.clone()));
        }
    }

    fn videos(n: usize) -> Vec<Video> {
        (0..n)
            .map(|i| Video {
                embedded_url: format!("https://www.youtube.com/embed/v{}", i),
                channel: format!("channel {}", i),
            })
            .collect()
    }

    #[derive(Default)]
    struct FakeHost {
        mounted: Cell<usize>,
    }

    impl CarouselHost for FakeHost {
        type Handle = Carousel;

        fn has_carousel(&self) -> bool {
            self.mounted.get() > 0
        }

        fn mount(&self, carousel: Carousel) -> Result<Carousel, ExtensionError> {
            self.mounted.set(self.mounted.get() + 1);
            Ok(carousel)
        }
    }

    fn storage_with(title: &str, n: usize) -> MemoryStorage {
        let storage = MemoryStorage::new();
        let dataset = ProblemDataset {
            questions: vec![Question {
                title: title.to_string(),
                frontend_id: 1,
                companies: None,
                videos: videos(n),
            }],
        };
        block_on(storage.set(KEY_PROBLEMS, &dataset)).unwrap();
        storage
    }

    #[test]
    fn full_cycle_returns_to_start() {
        for n in 1..=5 {
            let mut carousel = Carousel::new(videos(n)).unwrap();
            for direction in [Direction::Next, Direction::Prev] {
                let start = carousel.current_index();
                for _ in 0..n {
                    carousel.advance(direction);
                }
                assert_eq!(carousel.current_index(), start);
            }
        }
    }

    #[test]
    fn prev_from_first_wraps_to_last() {
        let mut carousel = Carousel::new(videos(3)).unwrap();
        assert_eq!(carousel.advance(Direction::Prev).channel, "channel 2");
        assert_eq!(carousel.advance(Direction::Next).channel, "channel 0");
        assert_eq!(carousel.advance(Direction::Next).channel, "channel 1");
        assert_eq!(carousel.current().embedded_url, "https://www.youtube.com/embed/v1");
    }

    #[test]
    fn stepping_shows_the_video_it_lands_on() {
        let carousel = RefCell::new(Carousel::new(videos(3)).unwrap());
        let view = RecordingView::default();

        step(&carousel, &view, Direction::Next);
        step(&carousel, &view, Direction::Prev);
        step(&carousel, &view, Direction::Prev);

        let shown = view.shown.borrow();
        assert_eq!(
            *shown,
            vec![
                ("https://www.youtube.com/embed/v1".to_string(), "channel 1".to_string()),
                ("https://www.youtube.com/embed/v0".to_string(), "channel 0".to_string()),
                ("https://www.youtube.com/embed/v2".to_string(), "channel 2".to_string()),
            ]
        );
        assert_eq!(carousel.borrow().current_index(), 2);
    }

    #[test]
    fn empty_video_list_builds_nothing() {
        assert!(Carousel::new(Vec::new()).is_none());

        let host = FakeHost::default();
        let storage = storage_with("Two Sum", 0);
        let handle = block_on(add_video(&host, &storage, "Two Sum")).unwrap();
        assert!(handle.is_none());
        assert_eq!(host.mounted.get(), 0);
    }

    #[test]
    fn second_insertion_is_a_no_op() {
        let host = FakeHost::default();
        let storage = storage_with("Two Sum", 2);

        let first = block_on(add_video(&host, &storage, "Two Sum")).unwrap();
        assert_eq!(first.map(|c| c.len()), Some(2));

        let second = block_on(add_video(&host, &storage, "Two Sum")).unwrap();
        assert!(second.is_none());
        assert_eq!(host.mounted.get(), 1);
    }

    #[test]
    fn missing_data_degrades_silently() {
        let host = FakeHost::default();
        let empty = MemoryStorage::new();
        assert!(block_on(add_video(&host, &empty, "Two Sum")).unwrap().is_none());

        let storage = storage_with("Two Sum", 1);
        assert!(block_on(add_video(&host, &storage, "Three Sum")).unwrap().is_none());
        assert_eq!(host.mounted.get(), 0);
    }
}
