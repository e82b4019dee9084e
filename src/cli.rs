//! Command-line interface definitions and argument parsing

use crate::model::KMeansFitter;
use crate::palette::Palette;
use crate::pipeline::SegmentationConfig;
use clap::Parser;

/// Customer segmentation with automatic cluster-count selection
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input table (one customer per row, numeric columns)
    #[arg(short, long, default_value = "customer_age_book_price.txt")]
    pub input: String,

    /// Column separator of the input table
    #[arg(long, default_value = " ")]
    pub separator: char,

    /// Smallest cluster count to evaluate
    #[arg(long, default_value = "1")]
    pub k_min: usize,

    /// Largest cluster count to evaluate
    #[arg(long, default_value = "10")]
    pub k_max: usize,

    /// Elbow sensitivity: maximum difference (in percent) between consecutive
    /// inertia ratios
    #[arg(long, default_value = "25")]
    pub accepted_variance: f64,

    /// Cluster count to use when no elbow is found (default: number of
    /// candidates + 1)
    #[arg(long)]
    pub default_k: Option<usize>,

    /// Segment labels and colors, smallest segment first
    /// Example: --palette "Usual:orange,Ideal:red,Older:purple,Young:blue"
    #[arg(long)]
    pub palette: Option<String>,

    /// Output path for the segment plot; the elbow chart is written next to it
    #[arg(short, long, default_value = "segments.png")]
    pub output: String,

    /// Maximum iterations for K-Means algorithm
    #[arg(long, default_value = "500")]
    pub max_iters: u64,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Random seed for K-Means initialisation
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Fit candidate cluster counts in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Skip writing the charts
    #[arg(long)]
    pub no_plot: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse the palette option, falling back to the default four segments
    pub fn parse_palette(&self) -> crate::Result<Palette> {
        match self.palette {
            Some(ref entries) => Ok(entries.parse()?),
            None => Ok(Palette::default()),
        }
    }

    /// Separator as the single byte the CSV reader expects
    pub fn separator_byte(&self) -> crate::Result<u8> {
        u8::try_from(self.separator)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                anyhow::anyhow!("Separator must be an ASCII character: {:?}", self.separator)
            })
    }

    pub fn segmentation_config(&self) -> crate::Result<SegmentationConfig> {
        let palette = self.parse_palette()?;
        Ok(SegmentationConfig {
            k_min: self.k_min,
            k_max: self.k_max,
            accepted_variance: self.accepted_variance,
            default_tie_break: self.default_k,
            max_segments: palette.len(),
            palette,
            parallel: self.parallel,
        })
    }

    pub fn fitter(&self) -> KMeansFitter {
        KMeansFitter::new(self.max_iters, self.tolerance, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["segmentor"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = args(&[]);
        assert_eq!(args.separator, ' ');
        assert_eq!(args.k_min, 1);
        assert_eq!(args.k_max, 10);
        assert_eq!(args.accepted_variance, 25.0);
        assert_eq!(args.max_iters, 500);
        assert_eq!(args.seed, 42);
        assert!(!args.parallel);
        assert_eq!(args.default_k, None);

        let config = args.segmentation_config().unwrap();
        assert_eq!(config.palette, Palette::default());
        assert_eq!(config.max_segments, 4);
        assert_eq!(config.default_tie_break, None);
    }

    #[test]
    fn test_default_k_flows_into_config() {
        let config = args(&["--default-k", "3", "--k-max", "6"])
            .segmentation_config()
            .unwrap();
        assert_eq!(config.default_tie_break, Some(3));
        assert_eq!(config.k_max, 6);
    }

    #[test]
    fn test_parse_palette() {
        let mut args = args(&["--palette", "Low:green,High:#ff0000"]);
        let palette = args.parse_palette().unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.get(1).unwrap().label, "High");

        args.palette = None;
        assert_eq!(args.parse_palette().unwrap(), Palette::default());

        args.palette = Some("invalid".to_string());
        assert!(args.parse_palette().is_err());
    }

    #[test]
    fn test_separator_byte() {
        assert_eq!(args(&["--separator", ","]).separator_byte().unwrap(), b',');
        assert!(args(&["--separator", "é"]).separator_byte().is_err());
    }

    #[test]
    fn test_fitter_configuration() {
        let fitter = args(&["--seed", "7", "--max-iters", "50"]).fitter();
        assert_eq!(fitter.seed, 7);
        assert_eq!(fitter.max_iterations, 50);
    }
}
