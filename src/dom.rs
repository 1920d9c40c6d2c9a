//! Host page DOM plumbing for the content script: the carousel view, the
//! editor reader and the embed pointer guard.

use crate::carousel::{step, Carousel, CarouselHost, Direction, VideoView};
use crate::config::*;
use crate::{js_error_message, ExtensionError, Video};
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlIFrameElement};

fn dom_err(err: JsValue) -> ExtensionError {
    ExtensionError::Dom(js_error_message(&err))
}

fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T, ExtensionError> {
    document
        .create_element(tag)
        .map_err(dom_err)?
        .dyn_into::<T>()
        .map_err(|_| ExtensionError::Dom(format!("<{}> has an unexpected type", tag)))
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), ExtensionError> {
    let style = element.style();
    for (name, value) in styles {
        style.set_property(name, value).map_err(dom_err)?;
    }
    Ok(())
}

/// Elements that change when the carousel moves.
struct CarouselView {
    container: HtmlElement,
    frame: HtmlIFrameElement,
    channel: HtmlElement,
}

impl VideoView for CarouselView {
    fn show(&self, video: &Video) {
        self.frame.set_src(&video.embedded_url);
        self.channel.set_text_content(Some(&video.channel));
    }
}

/// A mounted carousel. Dropping it detaches the button listeners.
pub struct CarouselHandle {
    state: Rc<RefCell<Carousel>>,
    view: Rc<CarouselView>,
    _listeners: Vec<Closure<dyn FnMut()>>,
}

impl CarouselHandle {
    /// Build the container for `carousel`; not yet attached to the page.
    pub fn build(document: &Document, carousel: Carousel) -> Result<Self, ExtensionError> {
        let container: HtmlElement = create(document, "div")?;
        container.class_list().add_1(VIDEO_CONTAINER_CLASS).map_err(dom_err)?;
        let padding = format!("{}%", VIDEO_ASPECT_RATIO_PCT);
        set_styles(&container, &[("position", "relative"), ("padding-bottom", padding.as_str())])?;

        let controls: HtmlElement = create(document, "div")?;
        set_styles(
            &controls,
            &[
                ("display", "flex"),
                ("justify-content", "space-between"),
                ("position", "absolute"),
                ("width", "100%"),
                ("padding", "10px"),
                ("box-sizing", "border-box"),
                ("color", "#fff"),
            ],
        )?;
        container.append_child(&controls).map_err(dom_err)?;

        let prev: HtmlElement = create(document, "button")?;
        prev.set_text_content(Some("<<"));
        prev.class_list().add_1("prev-video").map_err(dom_err)?;
        controls.append_child(&prev).map_err(dom_err)?;

        let channel: HtmlElement = create(document, "div")?;
        set_styles(&channel, &[("text-align", "center")])?;
        controls.append_child(&channel).map_err(dom_err)?;

        let next: HtmlElement = create(document, "button")?;
        next.set_text_content(Some(">>"));
        next.class_list().add_1("next-video").map_err(dom_err)?;
        controls.append_child(&next).map_err(dom_err)?;

        let frame: HtmlIFrameElement = create(document, "iframe")?;
        frame.class_list().add_1(VIDEO_FRAME_CLASS).map_err(dom_err)?;
        frame.set_allow_fullscreen(true);
        set_styles(
            &frame,
            &[
                ("position", "absolute"),
                ("top", VIDEO_FRAME_TOP),
                ("width", "100%"),
                ("height", "100%"),
            ],
        )?;
        container.append_child(&frame).map_err(dom_err)?;

        let view = Rc::new(CarouselView {
            container,
            frame,
            channel,
        });
        view.show(carousel.current());
        let state = Rc::new(RefCell::new(carousel));

        let mut listeners = Vec::with_capacity(2);
        for (button, direction) in [(&prev, Direction::Prev), (&next, Direction::Next)] {
            let state = state.clone();
            let view = view.clone();
            let listener = Closure::<dyn FnMut()>::new(move || step(&*state, &*view, direction));
            button
                .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
                .map_err(dom_err)?;
            listeners.push(listener);
        }

        Ok(Self {
            state,
            view,
            _listeners: listeners,
        })
    }

    /// Move the carousel and refresh the embed and channel label.
    pub fn advance(&self, direction: Direction) {
        step(&*self.state, &*self.view, direction);
    }

    pub fn current_index(&self) -> usize {
        self.state.borrow().current_index()
    }

    /// Render target.
    pub fn container(&self) -> &HtmlElement {
        &self.view.container
    }
}

/// The host page's solutions tab, which the carousel is inserted before.
pub struct SolutionsTab {
    document: Document,
    tab: Element,
    parent: Element,
}

impl SolutionsTab {
    pub fn locate(document: &Document) -> Option<Self> {
        let tabs = document.query_selector_all(SOLUTIONS_TAB_SELECTOR).ok()?;
        let tab = tabs.item(SOLUTIONS_TAB_INDEX)?.dyn_into::<Element>().ok()?;
        let parent = tab.parent_element()?;
        Some(Self {
            document: document.clone(),
            tab,
            parent,
        })
    }
}

impl CarouselHost for SolutionsTab {
    type Handle = CarouselHandle;

    fn has_carousel(&self) -> bool {
        self.parent
            .query_selector(&format!("div.{}", VIDEO_CONTAINER_CLASS))
            .ok()
            .flatten()
            .is_some()
    }

    fn mount(&self, carousel: Carousel) -> Result<CarouselHandle, ExtensionError> {
        let handle = CarouselHandle::build(&self.document, carousel)?;
        self.parent
            .insert_before(handle.container(), Some(&*self.tab))
            .map_err(dom_err)?;
        Ok(handle)
    }
}

/// Text of the code editor, one rendered line per line.
pub fn read_editor_code(document: &Document) -> Option<String> {
    let lines = document.query_selector_all(EDITOR_LINE_SELECTOR).ok()?;
    if lines.length() == 0 {
        debug!("No editor lines on page");
        return None;
    }
    let code = (0..lines.length())
        .filter_map(|i| lines.item(i))
        .map(|line| line.text_content().unwrap_or_default().replace('\u{a0}', " "))
        .collect::<Vec<_>>()
        .join("\n");
    Some(code)
}

/// Label of the editor's language picker, e.g. `"Python3"`.
pub fn read_editor_language(document: &Document) -> Option<String> {
    let button = document.query_selector(LANGUAGE_BUTTON_SELECTOR).ok()??;
    let label = button.text_content()?.trim().to_string();
    (!label.is_empty()).then_some(label)
}

fn set_frame_pointer_events(document: &Document, value: &str) {
    let selector = format!("iframe.{}", VIDEO_FRAME_CLASS);
    if let Ok(Some(frame)) = document.query_selector(&selector) {
        if let Ok(frame) = frame.dyn_into::<HtmlElement>() {
            let _ = frame.style().set_property("pointer-events", value);
        }
    }
}

/// Resizing panes while the pointer is over the embed freezes the drag;
/// disable the embed's pointer events for the duration of a press.
pub fn install_frame_pointer_guard() -> Result<(), ExtensionError> {
    let window = gloo_utils::window();
    for (event, value) in [("mousedown", "none"), ("mouseup", "auto")] {
        let listener = Closure::<dyn FnMut()>::new(move || {
            set_frame_pointer_events(&gloo_utils::document(), value);
        });
        window
            .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
            .map_err(dom_err)?;
        listener.forget();
    }
    Ok(())
}
