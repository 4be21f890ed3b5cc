//! Drawing for every mode onto a 1-bit `DrawTarget`.
//!
//! Layout for a 128x64 panel with `FONT_5X8`:
//!
//! ```text
//! ┌──────────────────────────────┐ y = 0
//! │ mode body (scope / text)     │
//! │                              │
//! ├──────────────────────────────┤ y = height - 8
//! │ NN%  ▪▪            6x=16ms   │ stats row
//! └──────────────────────────────┘
//! ```

use core::fmt::Write;

use embedded_graphics::mono_font::{ascii::FONT_5X8, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use heapless::String;

use crate::machine::ScopeOption;
use crate::scope::{ScopeSettings, ScopeStyle, ScopeTrace};
use crate::Console;

/// Glyph cell height in pixels.
pub const FONT_HEIGHT: i32 = 8;
/// Glyph cell width in pixels.
pub const FONT_WIDTH: i32 = 5;

/// Menu rows shown at once.
const MENU_ROWS: usize = 8;

/// One line of the parameter view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRow<'a> {
    /// Parameter name
    pub name: &'a str,
    /// Current value
    pub value: f32,
    /// Unit suffix, may be empty
    pub units: &'a str,
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(&FONT_5X8, BinaryColor::On)
}

fn stroke() -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_stroke(BinaryColor::On, 1)
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Height of the area above the stats row.
fn body_height<D: DrawTarget>(target: &D) -> i32 {
    to_i32(target.bounding_box().size.height).saturating_sub(FONT_HEIGHT)
}

#[allow(clippy::cast_possible_truncation)] // Safety: row index bounded by display height
fn row_y(row: usize) -> i32 {
    (row as i32).saturating_mul(FONT_HEIGHT)
}

fn draw_line<D>(target: &mut D, row: usize, x: i32, text: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Text::with_baseline(text, Point::new(x, row_y(row)), text_style(), Baseline::Top)
        .draw(target)?;
    Ok(())
}

/// Map a sample to a row within a band `height` pixels tall starting at `top`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)] // Safety: clamped sample, small band
fn sample_y(v: f32, top: i32, height: i32) -> i32 {
    let half = height as f32 * 0.5;
    let y = (1.0 - v.clamp(-1.0, 1.0)) * half;
    top.saturating_add(y as i32).min(top.saturating_add(height.saturating_sub(1)))
}

/// Draw the scope trace, one vertical min-to-max line per column.
#[allow(clippy::arithmetic_side_effects)] // Safety: small screen coordinates
pub fn draw_scope<D, const W: usize, const CH: usize>(
    target: &mut D,
    trace: &ScopeTrace<W, CH>,
    settings: ScopeSettings,
    option: ScopeOption,
    sample_rate: f32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let body = body_height(target);
    let width = to_i32(target.bounding_box().size.width);
    let channels = match settings.style {
        ScopeStyle::Mono => CH.min(1),
        ScopeStyle::Overlay | ScopeStyle::Split => CH,
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)] // Safety: CH is tiny
    let bands = if settings.style == ScopeStyle::Split { channels.max(1) as i32 } else { 1 };
    let band = body / bands;

    for ch in 0..channels {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)] // Safety: CH is tiny
        let top = if settings.style == ScopeStyle::Split { ch as i32 * band } else { 0 };
        for x in 0..W.min(usize::try_from(width).unwrap_or(0)) {
            let (min, max) = trace.column(ch, x);
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)] // Safety: x < width
            let px = x as i32;
            Line::new(
                Point::new(px, sample_y(min, top, band)),
                Point::new(px, sample_y(max, top, band)),
            )
            .into_styled(stroke())
            .draw(target)?;
        }
    }

    let mut label: String<24> = String::new();
    let _ = write!(
        label,
        "{} {}x={}ms",
        option.label(),
        settings.zoom.samples(),
        settings.zoom.duration_ms(W, sample_rate)
    );
    let right = TextStyleBuilder::new()
        .alignment(Alignment::Right)
        .baseline(Baseline::Top)
        .build();
    Text::with_text_style(&label, Point::new(width - 1, body), text_style(), right).draw(target)?;
    Ok(())
}

/// Draw console lines top to bottom, oldest first.
pub fn draw_console<D, const ROWS: usize, const COLS: usize>(
    target: &mut D,
    console: &Console<ROWS, COLS>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    for (row, line) in console.lines().enumerate() {
        draw_line(target, row, 0, line)?;
    }
    Ok(())
}

/// Draw the app list with a `>` marker on the provisional selection.
#[allow(clippy::arithmetic_side_effects)] // Safety: index arithmetic bounded by names.len()
pub fn draw_menu<D>(target: &mut D, names: &[&str], highlighted: usize) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let first = highlighted.saturating_sub(MENU_ROWS - 1);
    for (row, (index, name)) in names
        .iter()
        .enumerate()
        .skip(first)
        .take(MENU_ROWS)
        .enumerate()
    {
        if index == highlighted {
            draw_line(target, row, 0, ">")?;
        }
        draw_line(target, row, FONT_WIDTH, name)?;
    }
    Ok(())
}

/// Draw parameters as `name value units`; `>` marks the selection, `*`
/// while tweaking.
#[allow(clippy::arithmetic_side_effects)] // Safety: index arithmetic bounded by rows.len()
pub fn draw_params<D>(
    target: &mut D,
    rows: &[ParamRow<'_>],
    selected: usize,
    tweaking: bool,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let visible = usize::try_from(body_height(target) / FONT_HEIGHT)
        .unwrap_or(1)
        .max(1);
    let first = selected.saturating_sub(visible - 1);
    for (row, (index, param)) in rows.iter().enumerate().skip(first).take(visible).enumerate() {
        if index == selected {
            draw_line(target, row, 0, if tweaking { "*" } else { ">" })?;
        }
        let mut line: String<32> = String::new();
        let _ = write!(line, "{} {:.2}{}", param.name, param.value, param.units);
        draw_line(target, row, FONT_WIDTH, &line)?;
    }
    Ok(())
}

/// Draw the stats row: audio CPU percentage and MIDI activity dots.
#[allow(clippy::arithmetic_side_effects)] // Safety: small screen coordinates
pub fn draw_stats<D>(
    target: &mut D,
    cpu_percent: f32,
    midi_in: bool,
    midi_out: bool,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let y = body_height(target);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Safety: clamped to 0..=999
    let percent = cpu_percent.clamp(0.0, 999.0) as u32;
    let mut text: String<8> = String::new();
    let _ = write!(text, "{percent:02}%");
    Text::with_baseline(&text, Point::new(0, y), text_style(), Baseline::Top).draw(target)?;

    let dot = Size::new(3, 3);
    let fill = PrimitiveStyle::with_fill(BinaryColor::On);
    if midi_in {
        Rectangle::new(Point::new(FONT_WIDTH * 5, y + 2), dot)
            .into_styled(fill)
            .draw(target)?;
    }
    if midi_out {
        Rectangle::new(Point::new(FONT_WIDTH * 5 + 5, y + 2), dot)
            .into_styled(fill)
            .draw(target)?;
    }
    Ok(())
}

/// Frame the screen and name the active mode while selecting.
pub fn draw_selecting<D>(target: &mut D, mode_label: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let bounds = target.bounding_box();
    Rectangle::new(bounds.top_left, bounds.size)
        .into_styled(stroke())
        .draw(target)?;
    let centered = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();
    Text::with_text_style(mode_label, bounds.center(), text_style(), centered).draw(target)?;
    Ok(())
}

/// Audio CPU load as a percentage of the block period.
#[allow(clippy::cast_precision_loss)] // Safety: µs and block sizes are small
pub fn cpu_percent(cpu_us: u32, sample_rate: f32, block_size: usize) -> f32 {
    if block_size == 0 {
        return 0.0;
    }
    cpu_us as f32 * sample_rate / block_size as f32 / 10_000.0
}
