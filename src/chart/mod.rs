// src/chart/mod.rs

use anyhow::{anyhow, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::{ops::Range, path::Path};
use tracing::info;

use crate::dataset::{
    YearTable, CONCERTED_DETERRENCE, CYBER_CAPACITY, DEFENSE_BUDGET, ECONOMIES_OF_SCALE,
    INTELLIGENCE_SHARING, INTEROPERABILITY, INTEROPERABLE_EQUIPMENT, JOINT_EXERCISES,
    OPERATIONAL_EFFICIENCY, PERSONNEL, PESCO_PROJECTS, PROJECTION_CAPACITY, REACTION_TIME,
    REDUNDANCY_REDUCTION,
};
use crate::timeline::{Timeline, PESCO_LAUNCH};

pub const EU_BLUE: RGBColor = RGBColor(0x00, 0x55, 0xA4);
pub const EU_RED: RGBColor = RGBColor(0xFF, 0x00, 0x00);
pub const EU_YELLOW: RGBColor = RGBColor(0xFF, 0xCC, 0x00);
pub const EU_GREEN: RGBColor = RGBColor(0x00, 0x99, 0x00);
pub const EU_PURPLE: RGBColor = RGBColor(0x66, 0x00, 0x99);
pub const EU_ORANGE: RGBColor = RGBColor(0xFF, 0x66, 0x00);

const PALETTE: [RGBColor; 5] = [EU_BLUE, EU_RED, EU_YELLOW, EU_GREEN, EU_PURPLE];

const SIZE: (u32, u32) = (2000, 2400);
const FONT: &str = "sans-serif";

type PanelResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Columns compared in the before/after panel, with their axis labels.
pub const COMPARED: &[(&str, &str)] = &[
    (INTEROPERABILITY, "Interoperability"),
    (PROJECTION_CAPACITY, "Projection"),
    (OPERATIONAL_EFFICIENCY, "Efficiency"),
    (ECONOMIES_OF_SCALE, "Economies"),
];

/// Specialisation columns, drawn together when present.
pub const SPECIALISATIONS: &[&str] = &[CYBER_CAPACITY, INTELLIGENCE_SHARING, CONCERTED_DETERRENCE];

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub label: &'static str,
    pub before: Option<f64>,
    pub after: Option<f64>,
}

/// Means of the compared columns before the launch year and from it on.
pub fn before_after(table: &YearTable) -> Vec<Comparison> {
    COMPARED
        .iter()
        .map(|&(col, label)| Comparison {
            label,
            before: table.mean_where(col, |y| y < PESCO_LAUNCH),
            after: table.mean_where(col, |y| y >= PESCO_LAUNCH),
        })
        .collect()
}

/// `Foo_Bar` → `Foo Bar`.
pub fn column_label(name: &str) -> String {
    name.replace('_', " ")
}

fn x_range(table: &YearTable) -> Range<i32> {
    match (table.years().first(), table.years().last()) {
        (Some(&a), Some(&b)) if a < b => a..b,
        (Some(&a), _) => a..a + 1,
        _ => 0..1,
    }
}

/// Min..max of all `series`, padded by a tenth of the span.
pub fn padded_range<'s>(series: impl IntoIterator<Item = &'s [f64]>) -> Range<f64> {
    let (lo, hi) = series
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let pad = if hi - lo > 1e-9 {
        (hi - lo) * 0.1
    } else {
        hi.abs().max(1.0) * 0.1
    };
    (lo - pad)..(hi + pad)
}

fn points<'t>(years: &'t [i32], values: &'t [f64]) -> impl Iterator<Item = (i32, f64)> + 't {
    years.iter().copied().zip(values.iter().copied())
}

struct Line<'t> {
    label: String,
    values: &'t [f64],
    color: RGBColor,
}

fn line_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    table: &YearTable,
    title: &str,
    y_desc: &str,
    lines: &[Line<'_>],
) -> PanelResult<DB> {
    let y = padded_range(lines.iter().map(|l| l.values));
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 24))
        .margin(12)
        .x_label_area_size(35)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range(table), y)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(y_desc)
        .draw()?;

    for line in lines {
        let color = line.color;
        chart
            .draw_series(LineSeries::new(
                points(table.years(), line.values),
                color.stroke_width(2),
            ))?
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if !lines.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

/// Two series with their own y axes.
fn dual_axis_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    table: &YearTable,
    title: &str,
    left: (&Line<'_>, &str),
    right: (&Line<'_>, &str),
) -> PanelResult<DB> {
    let (l, l_desc) = left;
    let (r, r_desc) = right;
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 24))
        .margin(12)
        .x_label_area_size(35)
        .y_label_area_size(70)
        .right_y_label_area_size(90)
        .build_cartesian_2d(x_range(table), padded_range([l.values]))?
        .set_secondary_coord(x_range(table), padded_range([r.values]));

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(l_desc)
        .axis_desc_style((FONT, 16, &l.color))
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc(r_desc)
        .axis_desc_style((FONT, 16, &r.color))
        .draw()?;

    let lc = l.color;
    chart
        .draw_series(LineSeries::new(
            points(table.years(), l.values),
            lc.stroke_width(2),
        ))?
        .label(l.label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], lc));
    let rc = r.color;
    chart
        .draw_secondary_series(LineSeries::new(
            points(table.years(), r.values),
            rc.stroke_width(2),
        ))?
        .label(r.label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], rc));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn line<'t>(table: &'t YearTable, column: &str, label: &str, color: RGBColor) -> Option<Line<'t>> {
    table.get(column).map(|values| Line {
        label: label.to_string(),
        values,
        color,
    })
}

fn budget_personnel<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, table: &YearTable) -> PanelResult<DB> {
    let title = "Defense Budget and Personnel";
    let budget = line(table, DEFENSE_BUDGET, "Defense budget (bn EUR)", EU_BLUE);
    let personnel = line(table, PERSONNEL, "Personnel", EU_RED);
    match (budget, personnel) {
        (Some(b), Some(p)) => dual_axis_panel(
            area,
            table,
            title,
            (&b, "Budget (bn EUR)"),
            (&p, "Headcount"),
        ),
        (b, p) => {
            let lines: Vec<Line<'_>> = b.into_iter().chain(p).collect();
            line_panel(area, table, title, "", &lines)
        }
    }
}

fn efficiency_economies<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    table: &YearTable,
) -> PanelResult<DB> {
    let title = "Efficiency and Economies";
    let economies = line(table, ECONOMIES_OF_SCALE, "Economies of scale (bn EUR)", EU_BLUE);
    let redundancy = line(table, REDUNDANCY_REDUCTION, "Redundancy reduction (%)", EU_GREEN);
    match (economies, redundancy) {
        (Some(e), Some(r)) => dual_axis_panel(
            area,
            table,
            title,
            (&e, "Economies (bn EUR)"),
            (&r, "Reduction (%)"),
        ),
        (e, r) => {
            let lines: Vec<Line<'_>> = e.into_iter().chain(r).collect();
            line_panel(area, table, title, "", &lines)
        }
    }
}

/// Fewer days is better, so the axis runs downwards: values are negated
/// and the labels flip the sign back.
fn reaction_time<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, table: &YearTable) -> PanelResult<DB> {
    let negated: Vec<f64> = table
        .get(REACTION_TIME)
        .map(|v| v.iter().map(|d| -d).collect())
        .unwrap_or_default();
    let mut chart = ChartBuilder::on(area)
        .caption("Operational Reaction Time", (FONT, 24))
        .margin(12)
        .x_label_area_size(35)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range(table), padded_range([negated.as_slice()]))?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Days")
        .y_label_formatter(&|v| format!("{:.0}", -v))
        .draw()?;

    if negated.is_empty() {
        return Ok(());
    }
    chart
        .draw_series(LineSeries::new(
            points(table.years(), &negated),
            EU_BLUE.stroke_width(2),
        ))?
        .label("Reaction time (days)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], EU_BLUE));
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn before_after_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    table: &YearTable,
) -> PanelResult<DB> {
    let groups = before_after(table);
    let y_max = groups
        .iter()
        .flat_map(|g| [g.before, g.after])
        .flatten()
        .fold(1.0f64, f64::max)
        * 1.15;
    let last = (groups.len() as u32).saturating_sub(1);

    let mut chart = ChartBuilder::on(area)
        .caption("Before/After Reinforced Integration", (FONT, 24))
        .margin(12)
        .x_label_area_size(35)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..last).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Mean value")
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => groups
                .get(*i as usize)
                .map(|g| g.label.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    let bar = |from: SegmentValue<u32>, to: SegmentValue<u32>, v: f64, color: RGBColor| {
        let mut r = Rectangle::new([(from, 0.0), (to, v)], color.mix(0.7).filled());
        r.set_margin(0, 0, 3, 3);
        r
    };

    let before: Vec<_> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, g)| {
            let i = i as u32;
            g.before
                .map(|v| bar(SegmentValue::Exact(i), SegmentValue::CenterOf(i), v, EU_BLUE))
        })
        .collect();
    let after: Vec<_> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, g)| {
            let i = i as u32;
            g.after
                .map(|v| bar(SegmentValue::CenterOf(i), SegmentValue::Exact(i + 1), v, EU_RED))
        })
        .collect();

    let mut labelled = false;
    if !before.is_empty() {
        chart
            .draw_series(before)?
            .label(format!("Before {}", PESCO_LAUNCH))
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], EU_BLUE.mix(0.7).filled()));
        labelled = true;
    }
    if !after.is_empty() {
        chart
            .draw_series(after)?
            .label(format!("From {}", PESCO_LAUNCH))
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], EU_RED.mix(0.7).filled()));
        labelled = true;
    }
    if labelled {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

/// Lay out the eight panels (four rows, two columns) under one caption.
pub fn draw_panels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    table: &YearTable,
    name: &str,
    timeline: &Timeline,
) -> PanelResult<DB> {
    root.fill(&WHITE)?;
    let caption = format!(
        "European Military Integration Analysis - {} ({}-{})",
        name, timeline.start, timeline.end
    );
    let body = root.titled(&caption, (FONT, 40))?;
    let panels = body.split_evenly((4, 2));

    budget_personnel(&panels[0], table)?;

    let cooperation: Vec<Line<'_>> = [
        line(table, PESCO_PROJECTS, "PESCO projects", EU_BLUE),
        line(table, JOINT_EXERCISES, "Joint exercises", EU_RED),
    ]
    .into_iter()
    .flatten()
    .collect();
    line_panel(&panels[1], table, "European Military Cooperation", "Count", &cooperation)?;

    let capabilities: Vec<Line<'_>> = [
        line(table, PROJECTION_CAPACITY, "Projection capacity (%)", EU_BLUE),
        line(table, OPERATIONAL_EFFICIENCY, "Operational efficiency (%)", EU_RED),
    ]
    .into_iter()
    .flatten()
    .collect();
    line_panel(&panels[2], table, "Operational Capabilities", "Level (%)", &capabilities)?;

    let interop: Vec<Line<'_>> = [
        line(table, INTEROPERABILITY, "Interoperability (%)", EU_BLUE),
        line(table, INTEROPERABLE_EQUIPMENT, "Interoperable equipment (%)", EU_ORANGE),
    ]
    .into_iter()
    .flatten()
    .collect();
    line_panel(&panels[3], table, "Interoperability and Standardisation", "Level (%)", &interop)?;

    efficiency_economies(&panels[4], table)?;

    let specialisations: Vec<Line<'_>> = SPECIALISATIONS
        .iter()
        .filter_map(|c| table.get(c).map(|values| (c, values)))
        .enumerate()
        .map(|(i, (c, values))| Line {
            label: column_label(c),
            values,
            color: PALETTE[i % PALETTE.len()],
        })
        .collect();
    line_panel(
        &panels[5],
        table,
        "Specialisations and Advanced Capabilities (%)",
        "Level (%)",
        &specialisations,
    )?;

    reaction_time(&panels[6], table)?;
    before_after_panel(&panels[7], table)?;
    Ok(())
}

/// Render the panel grid to a PNG at `path`.
#[tracing::instrument(level = "info", skip_all, fields(name = %name, path = %path.as_ref().display()))]
pub fn render_png<P: AsRef<Path>>(
    table: &YearTable,
    name: &str,
    timeline: &Timeline,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    draw_panels(&root, table, name, timeline)
        .map_err(|e| anyhow!("drawing chart for {}: {}", name, e))?;
    root.present()
        .map_err(|e| anyhow!("writing {:?}: {}", path, e))?;
    info!("chart written");
    Ok(())
}
