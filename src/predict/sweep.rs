//! Sensitivity sweep
//!
//! Varies one per-game stat at a time around the entered value and records
//! the model's response, producing chart-ready series.

use serde::Serialize;

use super::estimator::WinPctModel;
use crate::{Result, TeamStats};

/// Offsets applied to the swept stat, in chart order
pub const SWEEP_OFFSETS: [i32; 11] = [-5, -4, -3, -2, -1, 0, 1, 2, 3, 4, 5];

/// Stats the sweep varies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStat {
    Points,
    Rebounds,
    Assists,
}

impl SweepStat {
    pub const ALL: [SweepStat; 3] = [SweepStat::Points, SweepStat::Rebounds, SweepStat::Assists];

    pub fn label(&self) -> &'static str {
        match self {
            SweepStat::Points => "Points",
            SweepStat::Rebounds => "Rebounds",
            SweepStat::Assists => "Assists",
        }
    }

    /// Copy of `stats` with this stat shifted by `offset`, floored at zero
    pub fn shifted(&self, stats: &TeamStats, offset: i32) -> TeamStats {
        let mut out = *stats;
        let field = match self {
            SweepStat::Points => &mut out.points_per_game,
            SweepStat::Rebounds => &mut out.rebounds_per_game,
            SweepStat::Assists => &mut out.assists_per_game,
        };
        *field = (*field + offset as f32).max(0.0);
        out
    }
}

/// One line on the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    /// Predicted win percentage at each offset in [`SWEEP_OFFSETS`]
    pub data: Vec<u8>,
}

impl Series {
    /// (offset, predicted%) pairs
    pub fn points(&self) -> impl Iterator<Item = (i32, u8)> + '_ {
        SWEEP_OFFSETS.iter().copied().zip(self.data.iter().copied())
    }
}

/// Label list plus one series per swept stat
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Series>,
}

/// Run the sweep for all three per-game stats.
///
/// Fails the same way `predict` does (model not ready, no games).
pub fn sweep<M: WinPctModel>(model: &M, stats: &TeamStats) -> Result<ChartData> {
    let datasets = SweepStat::ALL
        .iter()
        .map(|stat| {
            let data = SWEEP_OFFSETS
                .iter()
                .map(|&offset| Ok(model.predict(&stat.shifted(stats, offset))?.percent))
                .collect::<Result<Vec<u8>>>()?;
            Ok(Series {
                label: stat.label().to_string(),
                data,
            })
        })
        .collect::<Result<Vec<Series>>>()?;

    Ok(ChartData {
        labels: SWEEP_OFFSETS.iter().map(|o| o.to_string()).collect(),
        datasets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HoopsError, WinPrediction};

    /// Linear stand-in: each point per game adds one percent
    struct PointsModel;

    impl WinPctModel for PointsModel {
        fn predict(&self, stats: &TeamStats) -> Result<WinPrediction> {
            if stats.games() == 0 {
                return Err(HoopsError::NoGames);
            }
            Ok(WinPrediction::from_probability(stats.points_per_game / 100.0))
        }
    }

    struct NeverReady;

    impl WinPctModel for NeverReady {
        fn predict(&self, _stats: &TeamStats) -> Result<WinPrediction> {
            Err(HoopsError::NotReady)
        }
    }

    fn stats() -> TeamStats {
        TeamStats {
            wins: 50,
            losses: 32,
            points_per_game: 50.0,
            rebounds_per_game: 3.0,
            assists_per_game: 25.0,
        }
    }

    #[test]
    fn test_sweep_shape() {
        let chart = sweep(&PointsModel, &stats()).unwrap();

        assert_eq!(chart.labels.len(), 11);
        assert_eq!(chart.labels.first().map(String::as_str), Some("-5"));
        assert_eq!(chart.labels.last().map(String::as_str), Some("5"));

        let labels: Vec<_> = chart.datasets.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Points", "Rebounds", "Assists"]);
        for series in &chart.datasets {
            assert_eq!(series.data.len(), 11);
            let offsets: Vec<i32> = series.points().map(|(o, _)| o).collect();
            assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_sweep_varies_only_one_stat() {
        let chart = sweep(&PointsModel, &stats()).unwrap();

        assert_eq!(chart.datasets[0].data, (45..=55).collect::<Vec<u8>>());
        // Rebounds and assists do not move this model
        assert!(chart.datasets[1].data.iter().all(|&p| p == 50));
        assert!(chart.datasets[2].data.iter().all(|&p| p == 50));
    }

    #[test]
    fn test_shift_floors_at_zero() {
        let shifted = SweepStat::Rebounds.shifted(&stats(), -5);
        assert_eq!(shifted.rebounds_per_game, 0.0);
        assert_eq!(shifted.points_per_game, 50.0);

        let shifted = SweepStat::Assists.shifted(&stats(), 4);
        assert_eq!(shifted.assists_per_game, 29.0);
    }

    #[test]
    fn test_sweep_propagates_rejections() {
        assert!(matches!(
            sweep(&NeverReady, &stats()),
            Err(HoopsError::NotReady)
        ));
        assert!(matches!(
            sweep(&PointsModel, &TeamStats::default()),
            Err(HoopsError::NoGames)
        ));
    }

    #[test]
    fn test_chart_serializes() {
        let chart = sweep(&PointsModel, &stats()).unwrap();
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["labels"][0], "-5");
        assert_eq!(json["datasets"][0]["label"], "Points");
        assert_eq!(json["datasets"][0]["data"].as_array().unwrap().len(), 11);
    }
}
