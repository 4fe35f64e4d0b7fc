use crate::export::assets::DecodedImage;
use crate::export::surface::{Surface, TextStyle};
use crate::export::template::{FontWeight, PageSize};
use chrono::{Datelike, Local, Timelike};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use pdf_writer::{Content, Date, Filter, Name, Pdf, Rect, Ref, Str, TextStr};
use std::io::Write;

const FONT_REGULAR: &[u8] = b"F1";
const FONT_BOLD: &[u8] = b"F2";

/// PDF backend for the page writer.
///
/// Images must be registered before the first page is opened: every page
/// lists all registered images in its resources.
pub struct PdfManager {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    page_refs: Vec<Ref>,
    current: Option<(Ref, Content)>,

    page_w: f32,
    page_h: f32,

    next_id: i32,
    font_id: Ref,
    bold_font_id: Ref,
    images: Vec<(String, Ref)>,
}

impl PdfManager {
    pub fn new(size: PageSize) -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);
        let bold_font_id = Ref::new(4);
        let next_id = 5;

        pdf.type1_font(font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_font_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        let (page_w, page_h) = size.dimensions();

        Self {
            pdf,
            catalog_id,
            pages_id,
            page_refs: Vec::new(),
            current: None,
            page_w,
            page_h,
            next_id,
            font_id,
            bold_font_id,
            images: Vec::new(),
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    /// Embed a decoded image as an XObject available to every later page.
    pub fn register_image(&mut self, name: &str, image: &DecodedImage) {
        let image_id = self.fresh_ref();
        let mask_id = image.alpha.as_ref().map(|_| self.fresh_ref());

        let rgb = deflate(&image.rgb);
        let mut xobj = self.pdf.image_xobject(image_id, &rgb);
        xobj.filter(Filter::FlateDecode);
        xobj.width(image.width as i32);
        xobj.height(image.height as i32);
        xobj.color_space().device_rgb();
        xobj.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            xobj.s_mask(mask_id);
        }
        drop(xobj);

        if let (Some(mask_id), Some(alpha)) = (mask_id, image.alpha.as_ref()) {
            let alpha = deflate(alpha);
            let mut mask = self.pdf.image_xobject(mask_id, &alpha);
            mask.filter(Filter::FlateDecode);
            mask.width(image.width as i32);
            mask.height(image.height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
        }

        self.images.push((name.to_string(), image_id));
    }

    fn xobject_name(index: usize) -> String {
        format!("Im{}", index + 1)
    }

    fn finalize_page(&mut self) {
        if let Some((id, content)) = self.current.take() {
            self.pdf.stream(id, &content.finish());
        }
    }

    /// Content stream of the open page; opens one if drawing starts early.
    fn content(&mut self) -> &mut Content {
        let current = match self.current.take() {
            Some(current) => current,
            None => (self.open_page(), Content::new()),
        };
        &mut self.current.insert(current).1
    }

    fn build_pages_tree(&mut self) {
        let mut pages = self.pdf.pages(self.pages_id);
        pages.count(self.page_refs.len() as i32);
        pages.kids(self.page_refs.iter().copied());
    }

    /// Close the document and return its bytes.
    pub fn finish(mut self, title: &str) -> Vec<u8> {
        if self.page_refs.is_empty() {
            self.begin_page();
        }
        self.finalize_page();

        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.build_pages_tree();

        let info_id = self.fresh_ref();
        let now = Local::now();
        self.pdf
            .document_info(info_id)
            .title(TextStr(title))
            .producer(TextStr(concat!("coursereport ", env!("CARGO_PKG_VERSION"))))
            .creation_date(
                Date::new(now.year() as u16)
                    .month(now.month() as u8)
                    .day(now.day() as u8)
                    .hour(now.hour() as u8)
                    .minute(now.minute() as u8)
                    .second(now.second() as u8),
            );

        self.pdf.finish()
    }

    /// Write the page object and return the id of its content stream.
    fn open_page(&mut self) -> Ref {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();
        self.page_refs.push(page_id);

        let names: Vec<(String, Ref)> = self
            .images
            .iter()
            .enumerate()
            .map(|(i, (_, id))| (Self::xobject_name(i), *id))
            .collect();

        let mut page = self.pdf.page(page_id);
        page.parent(self.pages_id)
            .media_box(Rect::new(0.0, 0.0, self.page_w, self.page_h))
            .contents(content_id);

        let mut resources = page.resources();
        resources
            .fonts()
            .pair(Name(FONT_REGULAR), self.font_id)
            .pair(Name(FONT_BOLD), self.bold_font_id);
        if !names.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, id) in &names {
                xobjects.pair(Name(name.as_bytes()), *id);
            }
        }
        drop(resources);
        drop(page);

        content_id
    }

    fn flip(&self, y: f32) -> f32 {
        self.page_h - y
    }
}

impl Surface for PdfManager {
    fn begin_page(&mut self) {
        self.finalize_page();
        let content_id = self.open_page();
        self.current = Some((content_id, Content::new()));
    }

    fn text(&mut self, x: f32, y: f32, style: &TextStyle, text: &str) {
        let y = self.flip(y);
        let font = match style.weight {
            FontWeight::Regular => FONT_REGULAR,
            FontWeight::Bold => FONT_BOLD,
        };
        let encoded = win_ansi(text);
        let [r, g, b] = style.color;

        let content = self.content();
        content.begin_text();
        content.set_fill_rgb(r, g, b);
        content.set_font(Name(font), style.size);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        content.show(Str(&encoded));
        content.end_text();
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rgb: [f32; 3]) {
        let y = self.flip(y + h);
        let content = self.content();
        content.save_state();
        content.set_fill_rgb(rgb[0], rgb[1], rgb[2]);
        content.rect(x, y, w, h);
        content.fill_nonzero();
        content.restore_state();
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rgb: [f32; 3]) {
        let y = self.flip(y + h);
        let content = self.content();
        content.save_state();
        content.set_stroke_rgb(rgb[0], rgb[1], rgb[2]);
        content.set_line_width(0.5);
        content.rect(x, y, w, h);
        content.stroke();
        content.restore_state();
    }

    fn has_image(&self, name: &str) -> bool {
        self.images.iter().any(|(n, _)| n == name)
    }

    fn image(&mut self, name: &str, x: f32, y: f32, w: f32, h: f32) {
        let Some(index) = self.images.iter().position(|(n, _)| n == name) else {
            return;
        };
        let xobject = Self::xobject_name(index);
        let y = self.flip(y + h);

        let content = self.content();
        content.save_state();
        content.transform([w, 0.0, 0.0, h, x, y]);
        content.x_object(Name(xobject.as_bytes()));
        content.restore_state();
    }

    fn page_count(&self) -> usize {
        self.page_refs.len()
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .unwrap_or_default()
}

/// Encode text for the standard fonts. Characters outside WinAnsi become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_keeps_spanish_letters() {
        assert_eq!(win_ansi("Año"), vec![b'A', 0xF1, b'o']);
        assert_eq!(win_ansi("Página"), vec![b'P', 0xE1, b'g', b'i', b'n', b'a']);
        assert_eq!(win_ansi("€"), vec![0x80]);
        assert_eq!(win_ansi("漢"), vec![b'?']);
    }

    #[test]
    fn finished_document_has_pdf_header_and_pages() {
        let mut pdf = PdfManager::new(PageSize::A4);
        pdf.begin_page();
        pdf.text(50.0, 60.0, &TextStyle::regular(10.0), "Hola");
        pdf.begin_page();
        assert_eq!(pdf.page_count(), 2);

        let bytes = pdf.finish("Informe");
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
