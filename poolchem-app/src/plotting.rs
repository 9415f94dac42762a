//! Charts of the treatment history, one image per parameter.

use anyhow::Result;
use chrono::{DateTime, Utc};
use poolchem_core::chemistry::ranges::IdealRange;
use poolchem_schemas::reading::Parameter;
use plotters::prelude::*;
use std::collections::BTreeMap;
use tracing::{info, warn};

type Series = BTreeMap<Parameter, Vec<(DateTime<Utc>, f64)>>;

/// Draws every parameter with at least two samples into `output_dir`.
pub fn generate_history_plots(
    output_dir: &str,
    series: &Series,
    ranges: &BTreeMap<Parameter, IdealRange>,
) -> Result<()> {
    let mut drawn = 0;
    for (parameter, samples) in series {
        if samples.len() < 2 {
            continue;
        }
        plot_parameter_history(output_dir, *parameter, samples, ranges.get(parameter))?;
        drawn += 1;
    }

    if drawn == 0 {
        warn!("not enough history to plot");
    } else {
        info!(output_dir, charts = drawn, "history charts saved");
    }
    Ok(())
}

/// A line chart of one parameter over time with its ideal band shaded.
fn plot_parameter_history(
    output_dir: &str,
    parameter: Parameter,
    samples: &[(DateTime<Utc>, f64)],
    range: Option<&IdealRange>,
) -> Result<()> {
    let (Some(&(start, _)), Some(&(end, _))) = (samples.first(), samples.last()) else {
        return Ok(());
    };

    let path = format!("{}/history_{}.png", output_dir, parameter.key());
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;
    let max_value = samples
        .iter()
        .map(|(_, v)| *v)
        .chain(range.map(|r| r.max))
        .fold(0.0, f64::max);
    let y_max = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} History", parameter.display_name()),
            ("sans-serif", 50).into_font(),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(start..end, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(format!("{} ({})", parameter.display_name(), parameter.unit()))
        .x_label_formatter(&|t: &DateTime<Utc>| t.format("%m-%d").to_string())
        .draw()?;

    if let Some(range) = range {
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(start, range.min), (end, range.max)],
                GREEN.mix(0.15).filled(),
            )))?
            .label(format!("Ideal ({}-{})", range.min, range.max))
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], GREEN.mix(0.3).filled()));
    }

    chart
        .draw_series(LineSeries::new(samples.iter().copied(), BLUE.stroke_width(2)))?
        .label(parameter.display_name())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart.draw_series(samples.iter().map(|&(t, v)| Circle::new((t, v), 4, BLUE.filled())))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
