use crate::config::KnowledgeBase;
use crate::plotting;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use poolchem_core::{
    analysis::{self, Trend},
    chemistry::{balance::WaterBalance, engine::{parse_levels, Assessment}, ranges::IdealRange},
    logger::TreatmentLogger,
    plan::{build_plan, TreatmentPlan},
    weather::analyze_weather_impact,
    PoolView,
};
use poolchem_schemas::{
    file_formats::ReadingsFile,
    pool::{PoolType, SanitizerType},
    reading::Parameter,
};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::{debug, info, warn};

/// Where an analysis run writes its results.
pub struct AnalysisOptions<'a> {
    pub output_dir: &'a str,
    pub history_path: Option<&'a str>,
    pub plot: bool,
}

/// Assesses one readings file, writes the run directory and appends the
/// results to the treatment history.
pub fn run_analysis(kb: &KnowledgeBase, readings_path: &Path, options: &AnalysisOptions<'_>) -> Result<()> {
    println!("\n--- [Workflow] Analyzing {:?} ---", readings_path);

    let content = fs::read_to_string(readings_path)
        .with_context(|| format!("Failed to read readings file {:?}", readings_path))?;
    // YAML is a superset of JSON, so one parser covers both formats.
    let file: ReadingsFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse readings file {:?}", readings_path))?;
    debug!(schema_version = %file.schema_version, readings = file.readings.len(), "readings parsed");

    let pool_type = match &file.pool_type {
        Some(label) => label.parse::<PoolType>()?,
        None => default_pool_type(file.pool.sanitizer_type),
    };
    let profile = pool_type.apply_to(&file.pool);

    let engine = kb.engine()?;
    let view = engine.pool(&profile);
    let readings = parse_levels(&file.readings)?;
    let assessment = view
        .assess(&readings, file.temperature_f)
        .with_context(|| format!("Failed to assess readings for pool '{}'", profile.name))?;
    for capped in assessment.capped() {
        warn!(
            parameter = %capped.parameter,
            compound = %capped.compound_name,
            amount = capped.amount,
            unit = %capped.unit,
            "dose limited to the single-addition ceiling"
        );
    }

    let plan = build_plan(&assessment, engine.safety());
    let recommendations = view.get_chemical_recommendations(&file.readings, pool_type.label(), file.weather.as_ref())?;
    let score = analysis::balance_score(&view, &readings);

    let run_dir = format!(
        "{}/{}_{}",
        options.output_dir,
        slug(&profile.name),
        Utc::now().format("%Y%m%d_%H%M%S")
    );
    fs::create_dir_all(&run_dir).with_context(|| format!("Failed to create output directory: {}", run_dir))?;

    // Copy the readings file to the output directory for traceability
    let file_name = readings_path.file_name().map_or("readings.yaml".into(), |n| n.to_os_string());
    fs::copy(readings_path, Path::new(&run_dir).join(file_name))?;

    write_plan_csv(&plan, &Path::new(&run_dir).join("treatment_plan.csv"))?;
    let assessment_path = Path::new(&run_dir).join("assessment.json");
    fs::write(&assessment_path, serde_json::to_string_pretty(&assessment)?)
        .with_context(|| format!("Failed to write {:?}", assessment_path))?;

    if let Some(history_path) = options.history_path {
        let mut logger = TreatmentLogger::new(history_path)
            .with_context(|| format!("Failed to open treatment history {}", history_path))?;
        logger.log_assessment(&assessment, Utc::now())?;
        info!(history_path, rows = assessment.parameters.len(), "assessment logged");

        if options.plot {
            let entries = analysis::load_history(history_path)?;
            let series = analysis::history_series(&entries, Some(&profile.name))?;
            let ranges: BTreeMap<Parameter, IdealRange> = series
                .keys()
                .filter_map(|&p| view.ideal_range(p).ok().map(|r| (p, r)))
                .collect();
            plotting::generate_history_plots(&run_dir, &series, &ranges)?;
        }
    } else if options.plot {
        warn!("plots need a treatment history; skipping");
    }

    print_assessment_report(&view, &assessment, &plan, &recommendations, score);
    if let Some(weather) = &file.weather {
        let impact = analyze_weather_impact(weather);
        println!("\nWeather Impact:");
        println!("  - Evaporation:    {:.2} in/day", impact.evaporation_rate);
        println!("  - Chlorine loss:  {:.2} ppm/day", impact.chlorine_loss);
        println!("  - Algae risk:     {}", impact.algae_risk);
    }
    println!("========================================");
    println!("\nResults are in '{}'", run_dir);
    Ok(())
}

/// The pool type that implies nothing beyond the profile's own sanitizer.
fn default_pool_type(sanitizer: SanitizerType) -> PoolType {
    match sanitizer {
        SanitizerType::Chlorine => PoolType::ChlorinePool,
        SanitizerType::SaltWater => PoolType::SaltWaterPool,
        SanitizerType::Bromine => PoolType::BrominePool,
    }
}

fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn write_plan_csv(plan: &TreatmentPlan, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;
    for step in &plan.steps {
        writer.serialize(step)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_assessment_report(
    view: &PoolView<'_>,
    assessment: &Assessment,
    plan: &TreatmentPlan,
    recommendations: &BTreeMap<String, String>,
    score: f64,
) {
    let profile = view.profile();
    println!("\n\n--- [Pool Chemistry Report] ---");
    println!("========================================");
    println!(
        "Pool: {} ({:.0} gal, {:?} surface, {:?} sanitizer)",
        profile.name, profile.volume_gallons, profile.surface_type, profile.sanitizer_type
    );
    println!("Water temperature: {:.0} F", assessment.temperature_f);
    println!("----------------------------------------");

    println!("\nReadings:");
    for p in &assessment.parameters {
        println!(
            "  - {:<18} {:>8.2} {:<4} ideal {}-{}  {}",
            p.parameter.display_name(),
            p.value,
            p.parameter.unit(),
            p.range.min,
            p.range.max,
            p.status
        );
    }

    if let Some(balance) = &assessment.balance {
        println!("\nWater Balance:");
        println!("  - LSI:  {:.2} ({})", balance.lsi, balance.tendency);
        println!("  - {}", balance.advice());
    }
    println!("\nBalance Score: {:.1} / 100", score);

    if !assessment.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &assessment.warnings {
            println!("  ! {}", warning);
        }
    }

    println!("\nTreatment Plan:");
    if plan.is_empty() {
        println!("  No chemical additions needed.");
    }
    for step in &plan.steps {
        println!(
            "  {}. [priority {}] {}{}",
            step.step,
            step.priority,
            step.instructions,
            if step.capped { " (capped)" } else { "" }
        );
        println!(
            "     start at +{} h, circulate {} h before the next step",
            step.start_after_hours, step.wait_hours
        );
        if !step.safety_notes.is_empty() {
            println!("     safety: {}", step.safety_notes);
        }
    }
    for warning in &plan.warnings {
        println!("  ! {}", warning);
    }
    if !plan.is_empty() {
        println!("  Total time: {} hours", plan.total_hours);
    }

    println!("\nRecommendations:");
    for (name, text) in recommendations {
        println!("  - {}: {}", name, text);
    }
}

/// Reads pad colors from a JSON map of chemical name to `[r, g, b]` and
/// prints the interpreted values.
pub fn run_strip(kb: &KnowledgeBase, pads_path: &Path, min_confidence: f64) -> Result<()> {
    let content =
        fs::read_to_string(pads_path).with_context(|| format!("Failed to read pad colors {:?}", pads_path))?;
    let pads: BTreeMap<String, [u8; 3]> =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse pad colors {:?}", pads_path))?;

    let strip = kb.strip_interpolator();
    if strip.calibrated_chemicals().next().is_none() {
        warn!("no strip calibration loaded; every pad will read as unknown");
    }
    let results = strip.analyze(&pads);
    let recommendations = strip.get_recommendations(&results);

    println!("\n--- [Test Strip] ---");
    for (chemical, reading) in &results {
        match reading.value {
            Some(value) => println!(
                "  - {:<16} {:>8.2}  (confidence {:.1}%)",
                chemical, value, reading.confidence
            ),
            None => println!("  - {:<16}  no calibration", chemical),
        }
        if reading.value.is_some() && reading.confidence < min_confidence {
            warn!(chemical = %chemical, confidence = reading.confidence, "low confidence pad reading");
        }
    }
    if !recommendations.is_empty() {
        println!("\nRecommendations:");
        for text in recommendations.values() {
            println!("  - {}", text);
        }
    }

    let usable = poolchem_core::StripInterpolator::to_readings(&results, min_confidence);
    debug!(usable = usable.len(), "strip readings usable by the engine");
    Ok(())
}

pub fn run_safety_check(kb: &KnowledgeBase, chemicals: &[String]) -> Result<()> {
    if chemicals.len() < 2 {
        bail!("Need at least two chemicals to check compatibility");
    }
    for chemical in chemicals {
        if kb.safety.record(chemical).is_none() {
            warn!(chemical = %chemical, "chemical not in safety data; treated as incompatible");
        }
    }
    let ids: Vec<&str> = chemicals.iter().map(String::as_str).collect();
    let conflicts = kb.safety.incompatible_pairs(&ids);

    println!("\n--- [Compatibility] ---");
    if conflicts.is_empty() {
        println!("  All {} chemicals can be used together.", ids.len());
    }
    for (a, b) in &conflicts {
        println!("  ! {} and {} must never be mixed.", a, b);
    }
    Ok(())
}

pub fn run_safety_info(kb: &KnowledgeBase, chemical: &str) -> Result<()> {
    let Some(record) = kb.safety.record(chemical) else {
        bail!("No safety data for '{}'", chemical);
    };
    println!("\n--- [Safety] {} ---", record.display_name);
    if let Some(formula) = &record.chemical_formula {
        println!("Formula: {}", formula);
    }
    println!("Hazard rating: {} / 4", record.hazard_rating);
    println!("\nPrecautions:");
    for precaution in kb.safety.get_safety_guidelines(chemical) {
        println!("  - {}", precaution);
    }
    if !record.storage_guidelines.is_empty() {
        println!("\nStorage: {}", record.storage_guidelines);
    }
    if !record.emergency_procedures.is_empty() {
        println!("Emergency: {}", record.emergency_procedures);
    }
    Ok(())
}

pub fn run_balance(ph: f64, alkalinity: f64, calcium_hardness: f64, temperature_f: f64) -> Result<()> {
    for (parameter, value) in [
        (Parameter::Ph, ph),
        (Parameter::Alkalinity, alkalinity),
        (Parameter::Hardness, calcium_hardness),
    ] {
        if !value.is_finite() || value < 0.0 || value > parameter.sanity_max() {
            bail!("{} of {} is outside 0-{}", parameter, value, parameter.sanity_max());
        }
    }
    let balance = WaterBalance::compute(ph, alkalinity, calcium_hardness, temperature_f);

    println!("\n--- [Langelier Saturation Index] ---");
    println!("  - Temperature factor: {:.1}", balance.temperature_factor);
    println!("  - Calcium factor:     {:.1}", balance.calcium_factor);
    println!("  - Alkalinity factor:  {:.1}", balance.alkalinity_factor);
    println!("  --------------------------------------");
    println!("  - LSI:                {:.2} ({})", balance.lsi, balance.tendency);
    println!("\n{}", balance.advice());
    Ok(())
}

/// Trend analysis over the treatment history, optionally with charts.
pub fn run_trend(kb: &KnowledgeBase, history_path: &str, pool: Option<&str>, plot_dir: Option<&str>) -> Result<()> {
    let entries = analysis::load_history(history_path)?;
    let series = analysis::history_series(&entries, pool)?;
    if series.is_empty() {
        println!("No history recorded{}.", pool.map_or(String::new(), |p| format!(" for '{}'", p)));
        return Ok(());
    }

    let engine = kb.engine()?;
    let ranges: BTreeMap<Parameter, IdealRange> = series
        .keys()
        .filter_map(|&p| engine.config().ranges.base(p).map(|r| (p, r)))
        .collect();

    println!("\n--- [Trends] ---");
    for (parameter, samples) in &series {
        let Some(range) = ranges.get(parameter) else {
            continue;
        };
        let values: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
        match analysis::analyze_trend(*parameter, &values, range) {
            Ok(trend) => print_trend(&trend),
            Err(e) => println!("  - {:<18} {}", parameter.display_name(), e),
        }
    }

    if let Some(dir) = plot_dir {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory: {}", dir))?;
        plotting::generate_history_plots(dir, &series, &ranges)?;
    }
    Ok(())
}

fn print_trend(trend: &Trend) {
    println!(
        "  - {:<18} {:<10} {:>+7.1}%  volatility {:.2}  latest {}",
        trend.parameter.display_name(),
        trend.direction,
        trend.percent_change,
        trend.volatility,
        trend.latest
    );
    println!("    {}", trend.recommendation);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_directories_use_safe_names() {
        assert_eq!(slug("Mom's Pool #2"), "Mom_s_Pool__2");
    }

    #[test]
    fn sanitizer_pool_type_keeps_the_profile() {
        use poolchem_schemas::pool::{PoolProfile, SurfaceType};

        for sanitizer in [SanitizerType::Chlorine, SanitizerType::SaltWater, SanitizerType::Bromine] {
            let profile = PoolProfile::new("p", 1.0, SurfaceType::Vinyl, sanitizer);
            assert_eq!(default_pool_type(sanitizer).apply_to(&profile), profile);
        }
    }

    #[test]
    fn bundled_readings_parse() {
        for name in ["backyard.yaml", "salt_lap.json"] {
            let content = fs::read_to_string(Path::new("../data/readings").join(name)).unwrap();
            let file: ReadingsFile = serde_yaml::from_str(&content).unwrap();
            assert!(parse_levels(&file.readings).is_ok(), "{}", name);
        }
    }
}
