/// Page elements the viewer is wired to
use clockview_core::ControlId;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlCanvasElement, HtmlElement, HtmlInputElement};

/// Canvas element id
pub const CANVAS_ID: &str = "bg";

/// One input element and the text element mirroring its value
pub struct ControlBinding {
    pub control: ControlId,
    pub input: HtmlInputElement,
    pub display: HtmlElement,
}

/// Every element handle the viewer needs, gathered up front and passed in
pub struct PageElements {
    pub canvas: HtmlCanvasElement,
    pub controls: Vec<ControlBinding>,
}

impl PageElements {
    /// Look up the canvas and the five control/display pairs by id
    pub fn lookup(document: &Document) -> Result<Self, JsValue> {
        let canvas = element::<HtmlCanvasElement>(document, CANVAS_ID)?;
        let controls = ControlId::ALL
            .into_iter()
            .map(|control| {
                Ok(ControlBinding {
                    control,
                    input: element::<HtmlInputElement>(document, control.element_id())?,
                    display: element::<HtmlElement>(document, &control.display_id())?,
                })
            })
            .collect::<Result<Vec<_>, JsValue>>()?;

        Ok(Self { canvas, controls })
    }
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has the wrong type")))
}
