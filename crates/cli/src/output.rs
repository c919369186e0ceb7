use serde_json::json;

use ubica_core::insights::{format_count, format_currency, format_percentage, StoreReport};
use ubica_core::map::{RenderPlan, ViewportPlan};
use ubica_core::orchestrator::EvaluationView;
use ubica_core::sales::SalesSeries;

pub fn print_evaluation(
    view: &EvaluationView,
    plan: Option<&RenderPlan>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let out = json!({ "view": view, "map": plan });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if let Some(err) = &view.error {
        println!("{err}");
    }

    if let Some(result) = &view.result {
        println!("{}", result.headline());
        println!("{}", result.gap_sentence());

        if let Some(params) = &result.optimized_parameters {
            println!();
            println!("Parámetros optimizados");
            println!("  Metros cuadrados:           {}", params.area_m2);
            println!("  Puertas de refrigeración:   {}", params.refrigeration_doors);
            println!("  Cajones de estacionamiento: {}", params.parking_spots);
            println!(
                "  Probabilidad óptima:        {}",
                format_percentage(Some(params.optimal_probability * 100.0))
            );
        }

        if let Some(text) = &result.recommendation_text {
            println!();
            println!("Recomendación");
            println!("{text}");
        }
    }

    if let Some(plan) = plan {
        println!();
        print_viewport(plan);
    }

    Ok(())
}

pub fn print_plan(plan: &RenderPlan, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    print_viewport(plan);
    if let RenderPlan::Map { markers, .. } = plan {
        for m in markers {
            let mark = if m.highlighted { "*" } else { " " };
            println!(
                "{mark} {:<10} {:>11.6} {:>12.6}  {}",
                m.id,
                m.latitude,
                m.longitude,
                m.color.as_str()
            );
        }
    }
    Ok(())
}

pub fn print_store(report: &StoreReport, series: &SalesSeries, json: bool) -> anyhow::Result<()> {
    if json {
        let out = json!({ "report": report, "sales": series });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let perf = &report.performance;
    println!("Tienda {}", report.store_id);
    println!();
    println!("Desempeño de ventas");
    println!("  Venta último mes:          {}", format_currency(perf.last_month));
    println!("  Promedio 6 meses previos:  {}", format_currency(perf.six_month_average));
    println!("  Venta máxima histórica:    {}", format_currency(perf.historical_max));
    println!("  Venta mínima histórica:    {}", format_currency(perf.historical_min));
    println!("  Comparativo vs promedio:   {}", format_percentage(perf.vs_average_pct));

    let demo = &report.demographics;
    println!();
    println!("Perfil demográfico");
    println!("  Población total:           {}", format_count(demo.total_population));
    println!("  Total de hogares:          {}", format_count(demo.total_households));
    println!("  Población econ. activa:    {}", format_count(demo.economically_active));
    println!("  Viviendas con automóvil:   {}", format_count(demo.households_with_car));

    println!();
    print_trend(series);
    Ok(())
}

pub fn print_series(series: &SalesSeries, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(series)?);
        return Ok(());
    }

    print_trend(series);
    Ok(())
}

fn print_trend(series: &SalesSeries) {
    println!("Tendencia de ventas");
    if series.is_empty() {
        println!("  Sin datos");
    }
    for (label, value) in series.labels.iter().zip(&series.values) {
        println!("  {label:<10} {}", format_currency(*value));
    }
}

fn print_viewport(plan: &RenderPlan) {
    match plan {
        RenderPlan::Loading { message } => println!("{message}"),
        RenderPlan::Map { viewport, markers } => {
            let target = viewport.target();
            match viewport {
                ViewportPlan::Static(_) => println!(
                    "Mapa en ({:.6}, {:.6}) zoom {}, {} tiendas",
                    target.latitude,
                    target.longitude,
                    target.zoom,
                    markers.len()
                ),
                ViewportPlan::FlyTo { duration_ms, .. } => println!(
                    "Mapa vuela a ({:.6}, {:.6}) zoom {} en {duration_ms} ms, {} tiendas",
                    target.latitude,
                    target.longitude,
                    target.zoom,
                    markers.len()
                ),
            }
        }
    }
}
