// Status region, log region and control feedback
use board::{Action, LogLine, LogSegment, SelfStatus};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlImageElement, HtmlInputElement};

use crate::input::{CHAT_INPUT_ID, control_id};
use crate::render::{bomb_indicator_path, skin_path};

pub const NO_CONNECTION_MESSAGE: &str = "Disconnected";

const STATUS_ID: &str = "status";
const LOG_ID: &str = "log";
const PRESSED_CLASS: &str = "pressed";

/// Text part of the status region.
pub fn status_text(status: &SelfStatus) -> String {
    format!(
        " killed:{} deaths:{} suicides:{}",
        status.killed, status.deaths, status.suicides
    )
}

pub struct UI {
    document: Document,
}

impl UI {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn get_el(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn image(&self, src: &str, class: &str) -> Result<HtmlImageElement, JsValue> {
        let img = self
            .document
            .create_element("img")?
            .dyn_into::<HtmlImageElement>()?;
        img.set_src(src);
        img.set_class_name(class);
        Ok(img)
    }

    /// Redraw the status region: skin, counters, bomb indicator.
    pub fn update_status(&self, status: &SelfStatus) -> Result<(), JsValue> {
        let Some(region) = self.get_el(STATUS_ID) else {
            return Ok(());
        };
        region.set_inner_html("");
        region.class_list().remove_1("disconnected")?;

        if let Some(skin) = status.skin {
            region.append_child(&self.image(&skin_path(skin), "status-skin")?.into())?;
        }
        let text = self.document.create_element("span")?;
        text.set_text_content(Some(&status_text(status)));
        region.append_child(&text)?;
        region.append_child(&self.image(&bomb_indicator_path(status.can_drop), "status-bomb")?.into())?;
        Ok(())
    }

    pub fn show_disconnected(&self) {
        if let Some(region) = self.get_el(STATUS_ID) {
            region.set_text_content(Some(NO_CONNECTION_MESSAGE));
            region.class_list().add_1("disconnected").ok();
        }
    }

    pub fn show_connected(&self) {
        if let Some(region) = self.get_el(STATUS_ID) {
            region.set_text_content(None);
            region.class_list().remove_1("disconnected").ok();
        }
    }

    /// Append a log line, then trim the region to the newest `keep` lines.
    pub fn append_log(&self, line: &LogLine, keep: usize) -> Result<(), JsValue> {
        let Some(region) = self.get_el(LOG_ID) else {
            return Ok(());
        };
        let row = self.document.create_element("div")?;
        row.set_class_name(if line.from_self { "log-line self" } else { "log-line" });

        for segment in std::iter::once(&line.speaker).chain(&line.segments) {
            match segment {
                LogSegment::Skin(skin) => {
                    row.append_child(&self.image(&skin_path(*skin), "log-skin")?.into())?;
                }
                LogSegment::Text(text) => {
                    let span = self.document.create_element("span")?;
                    span.set_text_content(Some(text));
                    row.append_child(&span)?;
                }
            }
        }
        region.append_child(&row)?;

        while region.child_element_count() as usize > keep {
            match region.first_element_child() {
                Some(oldest) => oldest.remove(),
                None => break,
            }
        }
        region.set_scroll_top(region.scroll_height());
        Ok(())
    }

    /// Restart the "pressed" animation on the control for `action`.
    pub fn press_control(&self, action: Action) {
        let Some(control) = self.get_el(&control_id(action)) else {
            return;
        };
        let classes = control.class_list();
        classes.remove_1(PRESSED_CLASS).ok();
        // Reading layout forces a reflow so re-adding the class replays the animation
        if let Some(el) = control.dyn_ref::<HtmlElement>() {
            let _ = el.offset_width();
        }
        classes.add_1(PRESSED_CLASS).ok();
    }

    pub fn chat_input(&self) -> Option<HtmlInputElement> {
        self.get_el(CHAT_INPUT_ID)?.dyn_into::<HtmlInputElement>().ok()
    }

    /// True while the chat input has keyboard focus.
    pub fn is_chat_focused(&self) -> bool {
        self.document
            .active_element()
            .map(|el| el.id() == CHAT_INPUT_ID)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board::Skin;

    #[test]
    fn test_status_text() {
        let status = SelfStatus {
            skin: Skin::new(1),
            killed: 3,
            deaths: 1,
            suicides: 0,
            can_drop: true,
        };
        assert_eq!(status_text(&status), " killed:3 deaths:1 suicides:0");
    }
}
