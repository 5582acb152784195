//! Page "rendering" from embedded page images.
//!
//! Scanned documents carry one full-page image per page, which is all the
//! ink analysis needs. Pages without an image XObject cannot be measured
//! this way and are reported as render failures.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PageRasterizer, Result, load_document};
use crate::error::RenderError;

/// Extracts the largest embedded image of a page using lopdf.
///
/// The last parsed document is kept, so rendering every page of one file
/// parses it once.
#[derive(Debug, Default)]
pub struct EmbeddedImageRasterizer {
    cache: Mutex<Option<CachedDocument>>,
}

/// File size and modification time, to notice a rewritten file.
type FileStamp = (u64, Option<SystemTime>);

#[derive(Debug)]
struct CachedDocument {
    path: PathBuf,
    stamp: FileStamp,
    doc: Arc<Document>,
}

impl EmbeddedImageRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parsed document at `pdf_path`, reused while the file is unchanged.
    pub fn document(&self, pdf_path: &Path) -> Result<Arc<Document>> {
        let meta = fs::metadata(pdf_path).map_err(|e| RenderError::Parse(e.to_string()))?;
        let stamp = (meta.len(), meta.modified().ok());

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.as_ref() {
            if cached.path == pdf_path && cached.stamp == stamp {
                trace!("Reusing parsed {}", pdf_path.display());
                return Ok(Arc::clone(&cached.doc));
            }
        }

        let doc = Arc::new(load_document(pdf_path)?);
        *cache = Some(CachedDocument {
            path: pdf_path.to_path_buf(),
            stamp,
            doc: Arc::clone(&doc),
        });
        Ok(doc)
    }

    /// All decodable images referenced from a page's resources.
    pub fn page_images(&self, doc: &Document, page: u32) -> Result<Vec<DynamicImage>> {
        let pages = doc.get_pages();
        let page_id = pages
            .get(&page)
            .ok_or_else(|| RenderError::page(page, "no such page"))?;

        let mut images = Vec::new();

        if let Some(resources) = page_resources(doc, *page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, obj)) = doc.dereference(obj_ref) {
                            if let Some(img) = decode_image_object(doc, obj) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        debug!("Found {} images on page {}", images.len(), page);
        Ok(images)
    }
}

impl PageRasterizer for EmbeddedImageRasterizer {
    fn name(&self) -> &str {
        "embedded"
    }

    fn render_page(&self, pdf_path: &Path, page: u32, _dpi: u32) -> Result<DynamicImage> {
        let doc = self.document(pdf_path)?;

        self.page_images(&doc, page)?
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or_else(|| RenderError::page(page, "page has no embedded image"))
    }
}

/// Resources dictionary for a page, following `Parent` inheritance.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

fn decode_image_object(doc: &Document, obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
    trace!("Found image object: {}x{}", width, height);

    if let Ok(filter) = dict.get(b"Filter") {
        let filter_name = match filter {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            _ => None,
        };

        match filter_name {
            Some(b"DCTDecode") => {
                return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                    .ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Skipping image with unsupported filter");
                return None;
            }
            _ => {}
        }
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);

    decode_raw(&data, width, height, color_space, bits)
}

fn decode_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: i64,
) -> Option<DynamicImage> {
    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let pixels = width as usize * height as usize;

    match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
            RgbImage::from_raw(width, height, data[..pixels * 3].to_vec()).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            GrayImage::from_raw(width, height, data[..pixels].to_vec()).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!(
                "Could not decode image: colorspace={:?}, data_len={}",
                String::from_utf8_lossy(color_space),
                data.len()
            );
            None
        }
    }
}
