// DOM board: one <img> per cell, rows as .line containers
use board::{Dimensions, Position, Skin, Visual};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlImageElement};

const IMG_DIR: &str = "imgs";

/// Image used for a visual.
pub fn asset_path(visual: Visual) -> String {
    let file = match visual {
        Visual::Grass => "grass1",
        Visual::Wall => "wall1",
        Visual::BombFresh => "bomb1",
        Visual::BombArmed => "bomb2",
        Visual::ExplosionDefault => "boom1",
        Visual::ExplosionVertical => "boom2",
        Visual::ExplosionHorizontal => "boom3",
        Visual::User(skin) => return skin_path(skin),
    };
    format!("{IMG_DIR}/{file}.svg")
}

pub fn skin_path(skin: Skin) -> String {
    format!("{IMG_DIR}/user{}.svg", skin.ordinal())
}

/// Bomb availability indicator.
pub fn bomb_indicator_path(can_drop: bool) -> String {
    let file = if can_drop { "bomb_ok" } else { "bomb_nok" };
    format!("{IMG_DIR}/{file}.svg")
}

pub struct Renderer {
    document: Document,
    board: Element,
    cells: Vec<HtmlImageElement>,
    width: usize,
}

impl Renderer {
    pub fn new(document: Document, board_id: &str) -> Result<Self, JsValue> {
        let board = document
            .get_element_by_id(board_id)
            .ok_or_else(|| JsValue::from_str(&format!("{board_id} not found")))?;
        Ok(Self {
            document,
            board,
            cells: Vec::new(),
            width: 0,
        })
    }

    /// Rebuild the board as an all-grass grid.
    pub fn resize(&mut self, dims: Dimensions) -> Result<(), JsValue> {
        self.board.set_inner_html("");
        self.cells.clear();
        self.cells.reserve(dims.height * dims.width);
        self.width = dims.width;

        let grass = asset_path(Visual::Grass);
        for _ in 0..dims.height {
            let line = self.document.create_element("div")?;
            line.set_class_name("line");
            for _ in 0..dims.width {
                let cell = self
                    .document
                    .create_element("img")?
                    .dyn_into::<HtmlImageElement>()?;
                cell.set_class_name("cell");
                cell.set_src(&grass);
                line.append_child(&cell)?;
                self.cells.push(cell);
            }
            self.board.append_child(&line)?;
        }
        Ok(())
    }

    /// Paint changed cells; an image already showing the asset is left alone.
    pub fn paint(&self, cells: &[(Position, Visual)]) {
        for &(pos, visual) in cells {
            let Some(cell) = self.cell(pos) else {
                continue;
            };
            let path = asset_path(visual);
            if cell.get_attribute("src").as_deref() != Some(path.as_str()) {
                cell.set_src(&path);
                cell.set_title(visual.name());
            }
        }
    }

    fn cell(&self, pos: Position) -> Option<&HtmlImageElement> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        if x >= self.width {
            return None;
        }
        self.cells.get(y * self.width + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_paths() {
        assert_eq!(asset_path(Visual::Grass), "imgs/grass1.svg");
        assert_eq!(asset_path(Visual::BombArmed), "imgs/bomb2.svg");
        assert_eq!(asset_path(Visual::ExplosionHorizontal), "imgs/boom3.svg");
        assert_eq!(asset_path(Visual::User(Skin::new(4).unwrap())), "imgs/user4.svg");
    }

    #[test]
    fn test_bomb_indicator() {
        assert_eq!(bomb_indicator_path(true), "imgs/bomb_ok.svg");
        assert_eq!(bomb_indicator_path(false), "imgs/bomb_nok.svg");
    }
}
