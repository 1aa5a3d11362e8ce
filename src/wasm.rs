//! WebAssembly bindings for emoji-mosaic

use crate::status::{Status, Verdict};
use crate::{BudgetPolicy, Catalog, Converter, Mosaic};
use image::DynamicImage;
use wasm_bindgen::prelude::*;

fn to_js(e: crate::MosaicError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn log_status(status: &Status) {
    web_sys::console::log_1(&status.to_string().into());
}

#[wasm_bindgen]
pub struct WasmMosaic {
    converter: Converter,
}

#[wasm_bindgen]
impl WasmMosaic {
    /// Create a converter from the text of an emoji catalog document
    #[wasm_bindgen(constructor)]
    pub fn new(catalog_json: &str) -> Result<WasmMosaic, JsValue> {
        let catalog = Catalog::from_json(catalog_json).map_err(to_js)?;
        log_status(&Status::CatalogLoaded { count: catalog.len() });
        Ok(WasmMosaic { converter: Converter::new(catalog) })
    }

    #[wasm_bindgen]
    pub fn set_budget(&mut self, budget: usize) {
        self.converter.set_budget(budget);
    }

    #[wasm_bindgen]
    pub fn set_truncate(&mut self, enabled: bool) {
        let policy = if enabled { BudgetPolicy::Truncate } else { BudgetPolicy::ReportOnly };
        self.converter.set_policy(policy);
    }

    #[wasm_bindgen]
    pub fn avg_name_len(&self) -> f64 {
        self.converter.catalog().avg_name_len()
    }

    /// Generate from canvas RGBA pixel data
    #[wasm_bindgen]
    pub fn generate_rgba(&self, image_data: &[u8], width: u32, height: u32) -> Result<js_sys::Object, JsValue> {
        let img = image::RgbaImage::from_raw(width, height, image_data.to_vec())
            .ok_or_else(|| JsValue::from_str("Invalid image dimensions"))?;
        self.generate(&DynamicImage::ImageRgba8(img))
    }

    /// Generate from an encoded image file (PNG, JPEG, ...)
    #[wasm_bindgen]
    pub fn generate_encoded(&self, bytes: &[u8]) -> Result<js_sys::Object, JsValue> {
        log_status(&Status::ImageLoading);
        let img = image::load_from_memory(bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.generate(&img)
    }

    fn generate(&self, image: &DynamicImage) -> Result<js_sys::Object, JsValue> {
        let converter = &self.converter;
        let spec = converter.plan(image.width(), image.height());
        log_status(&Status::Generating { cols: spec.cols, rows: spec.rows, estimated: spec.estimated_chars });

        let mosaic = converter.convert_with(image, spec);
        let status = Status::Done {
            length: mosaic.length,
            budget: converter.budget(),
            truncated: mosaic.truncated,
            verdict: Verdict::of(mosaic.length, converter.budget()),
        };
        log_status(&status);

        to_object(&mosaic, &status)
    }
}

fn to_object(mosaic: &Mosaic, status: &Status) -> Result<js_sys::Object, JsValue> {
    let result = js_sys::Object::new();
    js_sys::Reflect::set(&result, &"text".into(), &mosaic.text.as_str().into())?;
    js_sys::Reflect::set(&result, &"cols".into(), &mosaic.grid.cols.into())?;
    js_sys::Reflect::set(&result, &"rows".into(), &mosaic.grid.rows.into())?;
    js_sys::Reflect::set(&result, &"estimatedChars".into(), &(mosaic.grid.estimated_chars as u32).into())?;
    js_sys::Reflect::set(&result, &"length".into(), &(mosaic.length as u32).into())?;
    js_sys::Reflect::set(&result, &"truncated".into(), &mosaic.truncated.into())?;
    js_sys::Reflect::set(&result, &"status".into(), &status.to_string().into())?;
    Ok(result)
}
