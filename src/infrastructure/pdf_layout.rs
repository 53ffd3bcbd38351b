//! PDF 版面读取 - 基础设施层
//!
//! 只负责把字节流变成按版面顺序排列的文本片段（带字号），
//! 不认识主题 / 小节。
//!
//! 字号 = Tf 字号 × (文本矩阵 × 坐标变换矩阵) 的纵向缩放；坐标变换矩阵由 `cm` 累乘，
//! `q` / `Q` 保存与恢复。
//!
//! 文本解码只处理两种情况：带 BOM 的 UTF-16BE 和单字节编码（按 Latin-1 读取）。
//! 使用 CID 字体（Identity-H）的文档会得到乱码片段，字号仍然正确。

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};
use tracing::debug;

use crate::error::{AppResult, StructuringError};

/// TJ 数组里的字距调整小于该值（千分之一字号）时视为词间空格
const TJ_SPACE_THRESHOLD: f64 = -200.0;

/// 单位矩阵 [a b c d e f]
const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// 矩阵乘法 `lhs × rhs`（PDF 行向量约定）
fn multiply(lhs: [f64; 6], rhs: [f64; 6]) -> [f64; 6] {
    let [a1, b1, c1, d1, e1, f1] = lhs;
    let [a2, b2, c2, d2, e2, f2] = rhs;
    [
        a1 * a2 + b1 * c2,
        a1 * b2 + b1 * d2,
        c1 * a2 + d1 * c2,
        c1 * b2 + d1 * d2,
        e1 * a2 + f1 * c2 + e2,
        e1 * b2 + f1 * d2 + f2,
    ]
}

/// 一段字号一致、位于同一行的文本
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    /// 有效字号（Tf 字号 × 文本矩阵与坐标变换矩阵合成后的纵向缩放）
    pub size: f64,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, size: f64) -> Self {
        Self {
            text: text.into(),
            size,
        }
    }

    /// 四舍五入后的字号
    pub fn rounded_size(&self) -> i64 {
        self.size.round() as i64
    }
}

/// 内容流解释时的文本状态
#[derive(Debug)]
struct TextState {
    font_size: f64,
    /// 文本矩阵 [a b c d e f]
    matrix: [f64; 6],
    /// 坐标变换矩阵（cm），q / Q 保存与恢复
    ctm: [f64; 6],
    ctm_stack: Vec<[f64; 6]>,
    current: String,
    current_size: f64,
    spans: Vec<TextSpan>,
}

impl TextState {
    fn new() -> Self {
        Self {
            font_size: 0.0,
            matrix: IDENTITY,
            ctm: IDENTITY,
            ctm_stack: Vec::new(),
            current: String::new(),
            current_size: 0.0,
            spans: Vec::new(),
        }
    }

    fn effective_size(&self) -> f64 {
        let [_, _, c, d, _, _] = multiply(self.matrix, self.ctm);
        self.font_size * (c * c + d * d).sqrt()
    }

    fn flush(&mut self) {
        let text = self.current.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            self.spans.push(TextSpan::new(text, self.current_size));
        }
        self.current.clear();
    }

    fn show(&mut self, text: &str) {
        let size = self.effective_size();
        if !self.current.is_empty() && (size - self.current_size).abs() > f64::EPSILON {
            self.flush();
        }
        self.current_size = size;
        self.current.push_str(text);
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        self.matrix = multiply([1.0, 0.0, 0.0, 1.0, tx, ty], self.matrix);
        // 纵向移动即换行
        if ty.abs() > f64::EPSILON {
            self.flush();
        }
    }

    fn apply(&mut self, op: &Operation) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                // 栈不平衡时保持当前矩阵
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                let values: Vec<f64> = operands.iter().filter_map(number).collect();
                if let Ok(matrix) = <[f64; 6]>::try_from(values) {
                    self.ctm = multiply(matrix, self.ctm);
                }
            }
            "BT" => {
                self.flush();
                self.matrix = IDENTITY;
            }
            "ET" => self.flush(),
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(number) {
                    self.font_size = size;
                }
            }
            "Tm" => {
                let values: Vec<f64> = operands.iter().filter_map(number).collect();
                if let Ok(matrix) = <[f64; 6]>::try_from(values) {
                    self.flush();
                    self.matrix = matrix;
                }
            }
            "Td" | "TD" => {
                let tx = operands.first().and_then(number).unwrap_or(0.0);
                let ty = operands.get(1).and_then(number).unwrap_or(0.0);
                self.translate(tx, ty);
            }
            "T*" => self.flush(),
            "Tj" => {
                if let Some(text) = operands.first().and_then(string_operand) {
                    self.show(&text);
                }
            }
            "'" => {
                self.flush();
                if let Some(text) = operands.first().and_then(string_operand) {
                    self.show(&text);
                }
            }
            "\"" => {
                self.flush();
                if let Some(text) = operands.get(2).and_then(string_operand) {
                    self.show(&text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let mut text = String::new();
                    for item in items {
                        match item {
                            Object::String(bytes, _) => text.push_str(&decode_text(bytes)),
                            other => {
                                if number(other).is_some_and(|kern| kern < TJ_SPACE_THRESHOLD) {
                                    text.push(' ');
                                }
                            }
                        }
                    }
                    self.show(&text);
                }
            }
            _ => {}
        }
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        other => other.as_float().ok().map(|v| v as f64),
    }
}

fn string_operand(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        _ => None,
    }
}

/// 解码 PDF 字符串：UTF-16BE（带 BOM）或单字节
pub fn decode_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// 按页序、内容流顺序读取所有文本片段
///
/// `Document` 在函数返回时释放，不会泄漏到调用方。
pub fn read_spans(bytes: &[u8]) -> AppResult<Vec<TextSpan>> {
    let document = Document::load_mem(bytes)?;

    let mut spans = Vec::new();
    for (page_number, page_id) in document.get_pages() {
        let raw = document
            .get_page_content(page_id)
            .map_err(|e| StructuringError::PageContentFailed {
                page: page_number,
                source: Box::new(e),
            })?;
        let content = Content::decode(&raw).map_err(|e| StructuringError::PageContentFailed {
            page: page_number,
            source: Box::new(e),
        })?;

        let mut state = TextState::new();
        for op in &content.operations {
            state.apply(op);
        }
        state.flush();

        debug!("📄 第 {} 页读取到 {} 个文本片段", page_number, state.spans.len());
        spans.append(&mut state.spans);
    }

    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream, StringFormat};

    fn text(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
    }

    fn ops(list: Vec<Operation>) -> Vec<TextSpan> {
        let mut state = TextState::new();
        for op in &list {
            state.apply(op);
        }
        state.flush();
        state.spans
    }

    /// 生成一页 PDF，每行 (字号, 文本)
    fn build_pdf(lines: &[(i64, &str)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = Vec::new();
        let mut y = 750;
        for (size, line) in lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), (*size).into()]));
            operations.push(Operation::new("Td", vec![50.into(), y.into()]));
            operations.push(Operation::new("Tj", vec![text(line)]));
            operations.push(Operation::new("ET", vec![]));
            y -= 30;
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("内容流编码失败"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("PDF 序列化失败");
        out
    }

    #[test]
    fn test_font_size_uses_text_matrix_scale() {
        let spans = ops(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 1.into()]),
            Operation::new(
                "Tm",
                vec![16.into(), 0.into(), 0.into(), 16.into(), 72.into(), 700.into()],
            ),
            Operation::new("Tj", vec![text("Heading")]),
            Operation::new("ET", vec![]),
        ]);
        assert_eq!(spans, vec![TextSpan::new("Heading", 16.0)]);
        assert_eq!(spans[0].rounded_size(), 16);
    }

    #[test]
    fn test_font_size_uses_page_matrix_scale() {
        let spans = ops(vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![2.into(), 0.into(), 0.into(), 2.into(), 0.into(), 0.into()],
            ),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 8.into()]),
            Operation::new("Tj", vec![text("Topic")]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 8.into()]),
            Operation::new("Tj", vec![text("after restore")]),
            Operation::new("ET", vec![]),
        ]);
        assert_eq!(spans[0].rounded_size(), 16);
        assert_eq!(spans[1].rounded_size(), 8);
    }

    #[test]
    fn test_page_and_text_matrix_scales_combine() {
        let half = || Object::Real(0.5);
        let spans = ops(vec![
            Operation::new(
                "cm",
                vec![half(), 0.into(), 0.into(), half(), 0.into(), 0.into()],
            ),
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![2.into(), 0.into(), 0.into(), 2.into(), 10.into(), 10.into()],
            ),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 1.into()]),
            Operation::new(
                "Tm",
                vec![14.into(), 0.into(), 0.into(), 14.into(), 72.into(), 600.into()],
            ),
            Operation::new("Tj", vec![text("Scaled")]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
            // 多余的 Q 不改变当前矩阵
            Operation::new("Q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 22.into()]),
            Operation::new("Tj", vec![text("Halved")]),
            Operation::new("ET", vec![]),
        ]);
        assert_eq!(spans[0].rounded_size(), 14);
        assert_eq!(spans[1].rounded_size(), 11);
    }

    #[test]
    fn test_size_change_and_newline_split_spans() {
        let spans = ops(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Tj", vec![text("first ")]),
            Operation::new("Tj", vec![text("part")]),
            Operation::new("Td", vec![0.into(), (-14).into()]),
            Operation::new("Tj", vec![text("second line")]),
            Operation::new("Tf", vec!["F1".into(), 14.into()]),
            Operation::new("Tj", vec![text("bigger")]),
            Operation::new("ET", vec![]),
        ]);
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["first part", "second line", "bigger"]);
        assert_eq!(spans[2].rounded_size(), 14);
    }

    #[test]
    fn test_tj_array_kerning_inserts_space() {
        let spans = ops(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    text("Hel"),
                    (-20).into(),
                    text("lo"),
                    (-400).into(),
                    text("world"),
                ])],
            ),
            Operation::new("ET", vec![]),
        ]);
        assert_eq!(spans[0].text, "Hello world");
    }

    #[test]
    fn test_decode_utf16_with_bom() {
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text(&bytes), "Hi");
        assert_eq!(decode_text(b"caf\xe9"), "café");
    }

    #[test]
    fn test_read_spans_from_document() {
        let pdf = build_pdf(&[(16, "Topic A"), (14, "Sub 1"), (11, "Body text here.")]);
        let spans = read_spans(&pdf).unwrap();
        let sizes: Vec<i64> = spans.iter().map(TextSpan::rounded_size).collect();
        assert_eq!(sizes, vec![16, 14, 11]);
        assert_eq!(spans[0].text, "Topic A");
    }

    #[test]
    fn test_garbage_bytes_are_unparsable() {
        let err = read_spans(b"definitely not a pdf").unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Structuring(StructuringError::Unparsable { .. })
        ));
    }
}
