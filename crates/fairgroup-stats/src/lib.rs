//! Statistics used to summarize fitness across a generation.
//!
//! # Examples
//!
//! ```
//! use fairgroup_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
//! assert_eq!(stats.mean, 2.5);
//! assert_eq!(stats.median, 2.5);
//! ```

pub mod descriptive;
