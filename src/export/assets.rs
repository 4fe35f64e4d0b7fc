//! Organization branding: logo and signature buffers plus the legal text
//! printed on certificates. Resolved once per export.

use crate::config::OrganizationConfig;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::warning;
use crate::utils::path::expand_tilde;
use std::collections::HashMap;
use std::fs;

pub const LOGO: &str = "logo";
pub const SIGNATURE: &str = "signature";

/// Reads asset files into memory.
pub trait AssetResolver {
    fn read(&self, path: &str) -> AppResult<Vec<u8>>;
}

/// Filesystem resolver; `~/` is expanded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsAssetResolver;

impl AssetResolver for FsAssetResolver {
    fn read(&self, path: &str) -> AppResult<Vec<u8>> {
        let full = expand_tilde(path);
        fs::read(&full).map_err(|e| AppError::Asset(format!("{}: {e}", full.display())))
    }
}

/// 8-bit RGB pixels with an optional 8-bit alpha plane.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub alpha: Option<Vec<u8>>,
}

impl DecodedImage {
    /// Decode PNG or JPEG bytes. Fully opaque images carry no alpha plane.
    pub fn decode(bytes: &[u8]) -> AppResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AppError::Asset(format!("cannot decode image: {e}")))?
            .to_rgba8();

        let (width, height) = img.dimensions();
        let pixels = (width as usize) * (height as usize);
        let mut rgb = Vec::with_capacity(pixels * 3);
        let mut alpha = Vec::with_capacity(pixels);

        for px in img.pixels() {
            rgb.extend_from_slice(&px.0[..3]);
            alpha.push(px.0[3]);
        }

        let alpha = if alpha.iter().all(|a| *a == u8::MAX) {
            None
        } else {
            Some(alpha)
        };

        Ok(Self {
            width,
            height,
            rgb,
            alpha,
        })
    }
}

/// Shared render context for every group of one export.
#[derive(Debug, Clone, Default)]
pub struct Branding {
    pub organization_name: String,
    pub responsible_name: String,
    pub responsible_text: String,
    pub images: HashMap<String, DecodedImage>,
    /// (asset name, reason) for every image that was dropped.
    pub degraded: Vec<(String, String)>,
}

impl Branding {
    /// Text-only branding, no images.
    pub fn text_only(org: &OrganizationConfig) -> Self {
        Self {
            organization_name: org.name.clone(),
            responsible_name: org.responsible_name.clone(),
            responsible_text: org.responsible_text.clone(),
            ..Self::default()
        }
    }

    pub fn image(&self, name: &str) -> Option<&DecodedImage> {
        self.images.get(name)
    }
}

fn load_image(resolver: &dyn AssetResolver, path: &str) -> AppResult<DecodedImage> {
    let bytes = resolver.read(path)?;
    DecodedImage::decode(&bytes)
}

/// Resolve logo and signature. A missing or broken file never fails the
/// export: the image is left out and the reason recorded in `degraded`.
pub fn load_branding(org: &OrganizationConfig, resolver: &dyn AssetResolver) -> Branding {
    let mut branding = Branding::text_only(org);

    let sources = [
        (LOGO, org.logo_path.as_deref()),
        (SIGNATURE, org.signature_path.as_deref()),
    ];

    for (name, path) in sources {
        let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
            continue;
        };

        match load_image(resolver, path) {
            Ok(img) => {
                branding.images.insert(name.to_string(), img);
            }
            Err(e) => {
                warning(format!("Skipping {name} image: {e}"));
                branding.degraded.push((name.to_string(), e.to_string()));
            }
        }
    }

    branding
}
