use chrono::{Duration, Utc};
use route_nav::api::{OutputFormat, UpdateFormatter};
use route_nav::core::{GeoPoint, LocationFix, Route};
use route_nav::navigation::NavigationSession;
use route_nav::utils::{ConfigurationManager, NavigationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn usage(program: &str) {
    eprintln!("Usage: {} <route.json> <fixes.json> [config.json] [--json]", program);
    eprintln!("   or: {} --demo [--json]", program);
}

fn print_events(formatter: &UpdateFormatter, events: &[route_nav::api::NavigationEvent]) {
    for event in events {
        println!("{}", formatter.format_event(event));
    }
}

/// Replay a fix sequence through one session and print every event
fn replay(
    route: Route,
    fixes: &[LocationFix],
    config: NavigationConfig,
    formatter: &UpdateFormatter,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = NavigationSession::with_validated_config(config)?;
    print_events(formatter, &session.start(route)?);

    for fix in fixes {
        match session.on_fix(fix) {
            Ok(events) => print_events(formatter, &events),
            Err(err) => eprintln!("skipping fix: {}", err),
        }
    }

    print_events(formatter, &session.stop());
    Ok(())
}

/// An L-shaped drive: east along the equator, then north
fn demo_route() -> (Route, Vec<LocationFix>) {
    let mut points: Vec<GeoPoint> = (0..=10).map(|i| GeoPoint::new(0.0, i as f64 * 0.0005)).collect();
    points.extend((1..=10).map(|i| GeoPoint::new(i as f64 * 0.0005, 0.005)));

    let route = Route::new(
        points.clone(),
        vec![
            "Head east".to_string(),
            "Turn left onto the avenue".to_string(),
            "You will arrive at your destination".to_string(),
        ],
    );

    let start = Utc::now();
    let fixes = points
        .iter()
        .chain(std::iter::repeat(&points[points.len() - 1]).take(10))
        .enumerate()
        .map(|(i, p)| {
            LocationFix::new(p.latitude, p.longitude, Some(12.0), start + Duration::seconds(5 * i as i64))
        })
        .collect();

    (route, fixes)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "route-nav".to_string());

    let json_output = args.iter().any(|a| a == "--json");
    args.retain(|a| a != "--json");
    let formatter = if json_output {
        UpdateFormatter::new().with_format(OutputFormat::Json)
    } else {
        UpdateFormatter::new()
    };

    if args.len() == 2 && args[1] == "--demo" {
        info!("running built-in demo route");
        let (route, fixes) = demo_route();
        return replay(route, &fixes, NavigationConfig::default(), &formatter);
    }

    if args.len() != 3 && args.len() != 4 {
        usage(&program);
        return Err("Invalid arguments".into());
    }

    let route: Route = serde_json::from_str(&std::fs::read_to_string(&args[1])?)?;
    let fixes: Vec<LocationFix> = serde_json::from_str(&std::fs::read_to_string(&args[2])?)?;
    let config = match args.get(3) {
        Some(path) => ConfigurationManager::from_file(path)?.config().clone(),
        None => NavigationConfig::default(),
    };

    info!(fixes = fixes.len(), "replaying fixes");
    replay(route, &fixes, config, &formatter)
}
