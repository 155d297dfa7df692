use std::process::ExitCode;

use tracing::{
    error,
    info
};
use tracing_subscriber::EnvFilter;

use splinedist::configuration::{
    ConfigurationError,
    DistributionConfiguration,
    GridConfiguration
};
use splinedist::distribution::sampler::create_rng;
use splinedist::validation::goodnessoffit::chi_square_test;

const TABLE_POINTS: usize = 11;

fn run(configuration: &DistributionConfiguration) -> Result<(), ConfigurationError> {
    let distribution = configuration.build()?;
    info!(
        degree = distribution.degree(),
        min_x = distribution.min_x(),
        max_x = distribution.max_x(),
        "distribution built"
    );

    println!("{:>10} {:>14} {:>14}", "x", "pdf(x)", "cdf(x)");
    let (lower, upper) = (distribution.min_x(), distribution.max_x());
    for i in 0..TABLE_POINTS {
        let x = lower + (upper - lower) * i as f64 / (TABLE_POINTS - 1) as f64;
        println!("{:>10.4} {:>14.8} {:>14.8}", x, distribution.evaluate(x), distribution.cdf(x));
    }

    println!("{:>10} {:>14}", "p", "ppf(p)");
    for i in 0..TABLE_POINTS {
        let p = i as f64 / (TABLE_POINTS - 1) as f64;
        println!("{:>10.4} {:>14.8}", p, distribution.quantile(p));
    }

    println!("P(0.2 < X < 0.8) = {:.8}", distribution.probability(0.2, 0.8));

    let mut rng = create_rng(configuration.sampling.seed);
    let samples = distribution.sample(configuration.sampling.size, &mut rng);
    info!(size = samples.len(), seed = configuration.sampling.seed, "sampled");

    // synthetic grids are checked against their generating density, tabulated ones
    // against the fitted spline
    let test = match &configuration.grid {
        GridConfiguration::Gaussian { .. } => chi_square_test(
            &samples,
            GridConfiguration::reference_density,
            configuration.goodness_of_fit.bins,
            lower,
            upper,
        )?,
        GridConfiguration::Tabulated { .. } => chi_square_test(
            &samples,
            |x| distribution.evaluate(x),
            configuration.goodness_of_fit.bins,
            lower,
            upper,
        )?
    };
    info!(
        statistic = test.statistic(),
        degrees_of_freedom = test.degrees_of_freedom(),
        p_value = test.p_value(),
        out_of_range = test.histogram().out_of_range(),
        rejected = test.rejects(configuration.goodness_of_fit.alpha),
        "goodness of fit"
    );
    Ok(())
}

fn main() -> ExitCode {
    let configuration = match std::env::args().nth(1) {
        Some(path) => match DistributionConfiguration::from_reader(&path) {
            Ok(configuration) => configuration,
            Err(err) => {
                eprintln!("failed to load configuration '{path}': {err}");
                return ExitCode::FAILURE;
            }
        },
        None => DistributionConfiguration::default()
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(configuration.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    match run(&configuration) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "run failed");
            ExitCode::FAILURE
        }
    }
}
