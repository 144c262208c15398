//! PDF receipt rendering.
//!
//! Draws the order receipt on a single A4 page from already-loaded order
//! data. Pure in-memory rendering; callers decide where the bytes go.

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Local, Utc};
use printpdf::path::PaintMode;
use printpdf::*;

use crate::domain::pricing::round_money;
use crate::errors::AppError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_X: f32 = 18.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - MARGIN_X * 2.0;

const PT_TO_MM: f32 = 0.352_778;
// Average Helvetica advance; close enough to center and right-align the
// short lines of a receipt without shipping font metrics.
const AVG_GLYPH_EM: f32 = 0.5;

/// One printed item row. `subtotal` uses the price recorded at checkout,
/// not the current catalog price.
#[derive(Debug, Clone)]
pub struct ReceiptLine {
    pub descricao: String,
    pub quantidade: i32,
    pub subtotal: BigDecimal,
}

/// Everything the renderer needs, denormalized so it never touches the
/// database.
#[derive(Debug, Clone)]
pub struct ReceiptData {
    pub pedido_id: i32,
    pub codigo_fiscal: String,
    pub cliente_nome: String,
    pub cliente_telefone: Option<String>,
    pub cliente_endereco: Option<String>,
    pub data_pedido: DateTime<Utc>,
    pub forma_pagamento: String,
    pub itens: Vec<ReceiptLine>,
    pub total_bruto: BigDecimal,
    pub desconto: BigDecimal,
    pub total_liquido: BigDecimal,
    pub observacao: Option<String>,
}

/// Formats a value as Brazilian currency: `R$ 1.234,56`.
pub fn format_brl(valor: &BigDecimal) -> String {
    let rounded = round_money(valor);
    let negative = rounded < BigDecimal::zero();
    let digits = rounded.abs().with_scale(2).to_string();
    let (inteiro, centavos) = match digits.split_once('.') {
        Some((i, c)) => (i.to_string(), c.to_string()),
        None => (digits, "00".to_string()),
    };

    let mut agrupado = String::new();
    for (pos, ch) in inteiro.chars().rev().enumerate() {
        if pos > 0 && pos % 3 == 0 {
            agrupado.push('.');
        }
        agrupado.push(ch);
    }
    let inteiro: String = agrupado.chars().rev().collect();

    if negative {
        format!("-R$ {inteiro},{centavos}")
    } else {
        format!("R$ {inteiro},{centavos}")
    }
}

fn format_data(data: &DateTime<Utc>) -> String {
    data.with_timezone(&Local).format("%d/%m/%Y, %H:%M").to_string()
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn text_width_mm(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * AVG_GLYPH_EM * PT_TO_MM
}

fn wrap_text(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width_mm(&candidate, font_size) > max_width && !current.is_empty() {
            lines.push(current);
            current = word.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

struct Canvas {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Canvas {
    // y runs top-down like the on-screen layout; PDF space runs bottom-up.
    fn text(&self, font: &IndirectFontRef, size: f32, x: f32, y: f32, text: &str) {
        self.layer
            .use_text(text, size, Mm(x), Mm(PAGE_HEIGHT - y), font);
    }

    fn text_centered(&self, font: &IndirectFontRef, size: f32, y: f32, text: &str) {
        let x = (PAGE_WIDTH - text_width_mm(text, size)) / 2.0;
        self.text(font, size, x, y, text);
    }

    fn text_right(&self, font: &IndirectFontRef, size: f32, right: f32, y: f32, text: &str) {
        let x = right - text_width_mm(text, size);
        self.text(font, size, x, y, text);
    }

    fn filled_rect(&self, x: f32, y_top: f32, width: f32, height: f32, fill: Color) {
        self.layer.set_fill_color(fill);
        let rect = Rect::new(
            Mm(x),
            Mm(PAGE_HEIGHT - y_top - height),
            Mm(x + width),
            Mm(PAGE_HEIGHT - y_top),
        )
        .with_mode(PaintMode::Fill);
        self.layer.add_rect(rect);
    }

    fn hline(&self, x1: f32, x2: f32, y: f32, color: Color) {
        self.layer.set_outline_color(color);
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(PAGE_HEIGHT - y)), false),
                (Point::new(Mm(x2), Mm(PAGE_HEIGHT - y)), false),
            ],
            is_closed: false,
        });
    }
}

/// Renders the receipt and returns the finished PDF bytes.
pub fn render_receipt(data: &ReceiptData) -> Result<Vec<u8>, AppError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Pedido {}", data.pedido_id),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Comprovante",
    );
    let canvas = Canvas {
        layer: doc.get_page(page).get_layer(layer),
        regular: builtin_font(&doc, BuiltinFont::Helvetica)?,
        bold: builtin_font(&doc, BuiltinFont::HelveticaBold)?,
        oblique: builtin_font(&doc, BuiltinFont::HelveticaOblique)?,
    };

    draw_header(&canvas, data);
    let y = draw_order_details(&canvas, data, 54.0);
    let y = draw_items(&canvas, data, y);
    let y = draw_totals(&canvas, data, y);
    draw_footer(&canvas, y);

    doc.save_to_bytes()
        .map_err(|e| AppError::Internal(format!("falha ao gerar o PDF: {e}")))
}

fn builtin_font(
    doc: &PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, AppError> {
    doc.add_builtin_font(font)
        .map_err(|e| AppError::Internal(format!("fonte indisponível: {e}")))
}

fn draw_header(canvas: &Canvas, data: &ReceiptData) {
    canvas.filled_rect(0.0, 0.0, PAGE_WIDTH, 42.0, rgb(58, 24, 10));
    canvas.layer.set_fill_color(rgb(255, 238, 225));
    canvas.text_centered(&canvas.bold, 20.0, 18.0, "Pizzaria Sabor & Arte");
    canvas.text_centered(
        &canvas.bold,
        12.0,
        27.0,
        "Comprovante Fiscal Digital (Modelo de Teste)",
    );
    canvas.layer.set_fill_color(rgb(255, 230, 208));
    canvas.text_centered(
        &canvas.bold,
        12.0,
        35.0,
        &format!("Código Fiscal: {}", data.codigo_fiscal),
    );
}

fn draw_order_details(canvas: &Canvas, data: &ReceiptData, mut y: f32) -> f32 {
    let right = MARGIN_X + CONTENT_WIDTH - 1.0;

    canvas.layer.set_fill_color(rgb(64, 35, 20));
    canvas.text(&canvas.bold, 12.0, MARGIN_X, y, "Dados do Pedido");
    y += 6.0;
    canvas.text(
        &canvas.regular,
        12.0,
        MARGIN_X,
        y,
        &format!("Pedido nº {}", data.pedido_id),
    );
    canvas.text_right(&canvas.regular, 12.0, right, y, &format_data(&data.data_pedido));
    y += 6.0;
    canvas.text(
        &canvas.regular,
        12.0,
        MARGIN_X,
        y,
        &format!("Cliente: {}", data.cliente_nome),
    );
    y += 6.0;
    let telefone = data.cliente_telefone.as_deref().unwrap_or("-");
    canvas.text(
        &canvas.regular,
        12.0,
        MARGIN_X,
        y,
        &format!("Contato: {telefone}"),
    );
    y += 6.0;
    let endereco = data.cliente_endereco.as_deref().unwrap_or("-");
    canvas.text(
        &canvas.regular,
        12.0,
        MARGIN_X,
        y,
        &format!("Endereço: {endereco}"),
    );
    y + 10.0
}

fn draw_items(canvas: &Canvas, data: &ReceiptData, mut y: f32) -> f32 {
    let col_descricao = CONTENT_WIDTH * 0.55;
    let col_qtd = CONTENT_WIDTH * 0.15;
    let col_valor = CONTENT_WIDTH * 0.3;
    let qtd_center = MARGIN_X + col_descricao + col_qtd / 2.0;
    let valor_right = MARGIN_X + col_descricao + col_qtd + col_valor - 4.0;

    canvas.layer.set_fill_color(rgb(64, 35, 20));
    canvas.text(&canvas.bold, 12.0, MARGIN_X, y, "Itens do Pedido");
    y += 4.0;

    canvas.filled_rect(MARGIN_X, y, CONTENT_WIDTH, 8.0, rgb(255, 213, 148));
    canvas.layer.set_fill_color(rgb(70, 30, 12));
    canvas.text(&canvas.bold, 12.0, MARGIN_X + 4.0, y + 5.5, "Descrição");
    let qtd_x = qtd_center - text_width_mm("Qtd.", 12.0) / 2.0;
    canvas.text(&canvas.bold, 12.0, qtd_x, y + 5.5, "Qtd.");
    canvas.text_right(&canvas.bold, 12.0, valor_right, y + 5.5, "Total (R$)");
    y += 12.0;

    canvas.layer.set_fill_color(rgb(92, 56, 34));
    for item in &data.itens {
        canvas.text(&canvas.regular, 12.0, MARGIN_X + 4.0, y, &item.descricao);
        let qtd = item.quantidade.to_string();
        let qtd_x = qtd_center - text_width_mm(&qtd, 12.0) / 2.0;
        canvas.text(&canvas.regular, 12.0, qtd_x, y, &qtd);
        canvas.text_right(
            &canvas.regular,
            12.0,
            valor_right,
            y,
            &format_brl(&item.subtotal),
        );
        canvas.hline(MARGIN_X, MARGIN_X + CONTENT_WIDTH, y + 3.0, rgb(222, 173, 130));
        y += 8.0;
    }
    y + 2.0
}

fn draw_totals(canvas: &Canvas, data: &ReceiptData, mut y: f32) -> f32 {
    let right = MARGIN_X + CONTENT_WIDTH - 1.0;
    let desconto_aplicado = data.desconto > BigDecimal::zero();

    canvas.layer.set_fill_color(rgb(77, 39, 21));
    canvas.text(&canvas.bold, 12.0, MARGIN_X, y, "Resumo Financeiro");
    y += 6.0;

    canvas.layer.set_fill_color(rgb(92, 56, 34));
    canvas.text(&canvas.regular, 12.0, MARGIN_X, y, "Forma de pagamento:");
    canvas.text_right(&canvas.regular, 12.0, right, y, &data.forma_pagamento);
    y += 6.0;
    canvas.text(&canvas.regular, 12.0, MARGIN_X, y, "Total bruto:");
    canvas.text_right(&canvas.regular, 12.0, right, y, &format_brl(&data.total_bruto));
    y += 6.0;
    canvas.text(&canvas.regular, 12.0, MARGIN_X, y, "Descontos aplicados:");
    if desconto_aplicado {
        canvas.text_right(
            &canvas.regular,
            12.0,
            right,
            y,
            &format!("-{}", format_brl(&data.desconto)),
        );
    } else {
        canvas.text_right(&canvas.regular, 12.0, right, y, "Nenhum");
    }
    y += 6.0;

    canvas.layer.set_fill_color(rgb(210, 83, 34));
    canvas.text(&canvas.bold, 12.0, MARGIN_X, y, "Total a pagar:");
    canvas.text_right(&canvas.bold, 12.0, right, y, &format_brl(&data.total_liquido));
    y += 8.0;

    if desconto_aplicado {
        let linhas = data
            .observacao
            .as_deref()
            .map(|obs| wrap_text(obs, 12.0, CONTENT_WIDTH - 8.0))
            .unwrap_or_default();
        let altura = if linhas.is_empty() {
            12.0
        } else {
            10.0 + linhas.len() as f32 * 5.5
        };
        canvas.filled_rect(MARGIN_X, y, CONTENT_WIDTH, altura, rgb(255, 232, 210));
        canvas.layer.set_fill_color(rgb(120, 60, 30));
        canvas.text(
            &canvas.bold,
            12.0,
            MARGIN_X + 4.0,
            y + 6.0,
            &format!("Desconto aplicado: -{}", format_brl(&data.desconto)),
        );
        let mut linha_y = y + 11.5;
        for linha in &linhas {
            canvas.text(&canvas.regular, 12.0, MARGIN_X + 4.0, linha_y, linha);
            linha_y += 5.5;
        }
        y += altura + 6.0;
    } else {
        y += 10.0;
        if let Some(obs) = data.observacao.as_deref() {
            canvas.layer.set_fill_color(rgb(77, 39, 21));
            canvas.text(&canvas.bold, 12.0, MARGIN_X, y, "Observações:");
            y += 6.0;
            canvas.layer.set_fill_color(rgb(92, 56, 34));
            for linha in wrap_text(obs, 12.0, CONTENT_WIDTH) {
                canvas.text(&canvas.regular, 12.0, MARGIN_X, y, &linha);
                y += 5.5;
            }
            y += 4.5;
        }
    }
    y
}

fn draw_footer(canvas: &Canvas, mut y: f32) {
    canvas.hline(MARGIN_X, MARGIN_X + CONTENT_WIDTH, y, rgb(205, 145, 100));
    y += 8.0;
    canvas.layer.set_fill_color(rgb(160, 120, 95));
    canvas.text_centered(
        &canvas.oblique,
        12.0,
        y,
        "Documento gerado automaticamente para fins acadêmicos. Não possui validade fiscal.",
    );
    y += 12.0;
    canvas.layer.set_fill_color(rgb(210, 170, 140));
    canvas.text_centered(
        &canvas.regular,
        12.0,
        y,
        "Pizzaria Sabor & Arte · Rua das Delícias, 123 · São Paulo/SP",
    );
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn sample() -> ReceiptData {
        ReceiptData {
            pedido_id: 42,
            codigo_fiscal: "NF-1719914000000".to_string(),
            cliente_nome: "Maria Souza".to_string(),
            cliente_telefone: Some("(11) 99999-0000".to_string()),
            cliente_endereco: Some("Rua das Flores, 200".to_string()),
            data_pedido: Utc.with_ymd_and_hms(2025, 8, 20, 18, 30, 0).unwrap(),
            forma_pagamento: "Pix".to_string(),
            itens: vec![
                ReceiptLine {
                    descricao: "Pizza Calabresa".to_string(),
                    quantidade: 3,
                    subtotal: dec("120.00"),
                },
                ReceiptLine {
                    descricao: "Refrigerante 2L".to_string(),
                    quantidade: 1,
                    subtotal: dec("12.00"),
                },
            ],
            total_bruto: dec("132.00"),
            desconto: dec("14.64"),
            total_liquido: dec("117.36"),
            observacao: Some(
                "Promoção 3+ pizzas (10%) | PIX acima de 100 (2%)".to_string(),
            ),
        }
    }

    #[test]
    fn renders_a_pdf_document() {
        let bytes = render_receipt(&sample()).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1_000);
    }

    #[test]
    fn renders_without_discount_or_contact_details() {
        let mut data = sample();
        data.desconto = BigDecimal::zero();
        data.total_liquido = data.total_bruto.clone();
        data.observacao = None;
        data.cliente_telefone = None;
        data.cliente_endereco = None;

        let bytes = render_receipt(&data).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_customer_note_without_discount_box() {
        let mut data = sample();
        data.desconto = BigDecimal::zero();
        data.total_liquido = data.total_bruto.clone();
        data.observacao = Some("Sem cebola na calabresa, por favor.".to_string());

        assert!(render_receipt(&data).is_ok());
    }

    #[test]
    fn formats_brazilian_currency() {
        assert_eq!(format_brl(&dec("91.8")), "R$ 91,80");
        assert_eq!(format_brl(&dec("1234.5")), "R$ 1.234,50");
        assert_eq!(format_brl(&dec("1000000")), "R$ 1.000.000,00");
        assert_eq!(format_brl(&dec("0")), "R$ 0,00");
        assert_eq!(format_brl(&dec("12.345")), "R$ 12,35");
        assert_eq!(format_brl(&dec("-4")), "-R$ 4,00");
    }

    #[test]
    fn wraps_long_notes_at_the_content_width() {
        let texto = "Promoção 3+ pizzas (10%) | Quarta da Pizza (5%) | PIX acima de 100 (2%) | Desconto combinado aplicado automaticamente no fechamento do pedido";
        let linhas = wrap_text(texto, 12.0, CONTENT_WIDTH - 8.0);

        assert!(linhas.len() > 1);
        for linha in &linhas {
            assert!(text_width_mm(linha, 12.0) <= CONTENT_WIDTH - 8.0);
        }
    }
}
