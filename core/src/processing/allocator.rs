use crate::interface::{CongestionLabel, CountVector, LaneTiming, TimingPlan};
use crate::prelude::{TrafficError, TrafficResult};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CongestionMultipliers {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for CongestionMultipliers {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 1.2,
            high: 1.5,
        }
    }
}

impl CongestionMultipliers {
    pub fn get(&self, label: CongestionLabel) -> f64 {
        match label {
            CongestionLabel::Low => self.low,
            CongestionLabel::Medium => self.medium,
            CongestionLabel::High => self.high,
        }
    }
}

/// `factor = min(1 + total / vehicle_scale, max_factor)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalFactorParams {
    pub vehicle_scale: f64,
    pub max_factor: f64,
}

impl Default for GlobalFactorParams {
    fn default() -> Self {
        Self {
            vehicle_scale: 20.0,
            max_factor: 2.0,
        }
    }
}

impl GlobalFactorParams {
    pub fn factor(&self, total: u64) -> f64 {
        (1.0 + total as f64 / self.vehicle_scale).min(self.max_factor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocatorKind {
    #[default]
    Proportional,
    GlobalFactor,
}

impl AllocatorKind {
    pub fn allocator(&self) -> &'static dyn SignalTimingAllocator {
        match self {
            AllocatorKind::Proportional => &ProportionalAllocator,
            AllocatorKind::GlobalFactor => &GlobalFactorAllocator,
        }
    }
}

impl fmt::Display for AllocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.allocator().name())
    }
}

impl FromStr for AllocatorKind {
    type Err = TrafficError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "proportional" => Ok(AllocatorKind::Proportional),
            "global_factor" | "global" => Ok(AllocatorKind::GlobalFactor),
            _ => Err(TrafficError::UnknownValue(format!(
                "allocation strategy '{}'",
                value
            ))),
        }
    }
}

/// Allocation parameters, all durations in whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingParams {
    pub lane_count: usize,
    /// Nominal total green time before congestion scaling.
    pub base_green_budget: u32,
    pub yellow: u32,
    pub base_red: u32,
    pub min_green: u32,
    pub max_green: u32,
    pub congestion_multiplier: CongestionMultipliers,
    pub strategy: AllocatorKind,
    pub global_factor: GlobalFactorParams,
}

impl Default for TimingParams {
    fn default() -> Self {
        Self {
            lane_count: 4,
            base_green_budget: 30,
            yellow: 5,
            base_red: 40,
            min_green: 10,
            max_green: 60,
            congestion_multiplier: CongestionMultipliers::default(),
            strategy: AllocatorKind::default(),
            global_factor: GlobalFactorParams::default(),
        }
    }
}

impl TimingParams {
    pub fn with_lane_count(mut self, lane_count: usize) -> Self {
        self.lane_count = lane_count;
        self
    }

    pub fn with_strategy(mut self, strategy: AllocatorKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> TrafficResult<()> {
        if self.lane_count == 0 {
            return Err(TrafficError::InvalidParams(
                "lane_count must be positive, got 0".into(),
            ));
        }
        if self.yellow == 0 {
            return Err(TrafficError::InvalidParams(
                "yellow must be positive, got 0".into(),
            ));
        }
        if self.min_green == 0 || self.min_green > self.max_green {
            return Err(TrafficError::InvalidParams(format!(
                "green bounds must satisfy 0 < min_green <= max_green, got {}..{}",
                self.min_green, self.max_green
            )));
        }
        let multipliers = self.congestion_multiplier;
        for (label, value) in [
            ("low", multipliers.low),
            ("medium", multipliers.medium),
            ("high", multipliers.high),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrafficError::InvalidParams(format!(
                    "congestion multiplier for {} must be positive, got {}",
                    label, value
                )));
            }
        }
        let factor = self.global_factor;
        if !factor.vehicle_scale.is_finite() || factor.vehicle_scale <= 0.0 {
            return Err(TrafficError::InvalidParams(format!(
                "vehicle_scale must be positive, got {}",
                factor.vehicle_scale
            )));
        }
        if !factor.max_factor.is_finite() || factor.max_factor < 1.0 {
            return Err(TrafficError::InvalidParams(format!(
                "max_factor must be at least 1, got {}",
                factor.max_factor
            )));
        }
        Ok(())
    }

    pub fn check_counts(&self, counts: &CountVector) -> TrafficResult<()> {
        if counts.len() != self.lane_count {
            return Err(TrafficError::InvalidCounts(format!(
                "expected {} lane counts, got {}",
                self.lane_count,
                counts.len()
            )));
        }
        Ok(())
    }

    /// `floor(base_green_budget * multiplier[label])`.
    pub fn green_budget(&self, label: CongestionLabel) -> u32 {
        let scaled = f64::from(self.base_green_budget) * self.congestion_multiplier.get(label);
        scaled.floor() as u32
    }

    fn clamp_green(&self, raw: u64) -> u32 {
        raw.clamp(u64::from(self.min_green), u64::from(self.max_green)) as u32
    }

    fn lane_timing(&self, green: u32, cycle_length: u32) -> TrafficResult<LaneTiming> {
        let red = green
            .checked_add(self.yellow)
            .and_then(|non_red| cycle_length.checked_sub(non_red))
            .ok_or_else(|| {
                TrafficError::InvalidParams(format!(
                    "green {} plus yellow {} exceeds cycle length {}",
                    green, self.yellow, cycle_length
                ))
            })?;
        Ok(LaneTiming {
            green,
            yellow: self.yellow,
            red,
        })
    }
}

pub trait SignalTimingAllocator: Send + Sync {
    fn name(&self) -> &'static str;

    fn allocate(
        &self,
        counts: &CountVector,
        label: CongestionLabel,
        params: &TimingParams,
    ) -> TrafficResult<TimingPlan>;
}

/// All-zero counts fall back to an equal share per lane.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalAllocator;

impl SignalTimingAllocator for ProportionalAllocator {
    fn name(&self) -> &'static str {
        "proportional"
    }

    fn allocate(
        &self,
        counts: &CountVector,
        label: CongestionLabel,
        params: &TimingParams,
    ) -> TrafficResult<TimingPlan> {
        params.validate()?;
        params.check_counts(counts)?;

        let green_budget = params.green_budget(label);
        let local_cycle = green_budget.checked_add(params.base_red).ok_or_else(|| {
            TrafficError::InvalidParams(format!(
                "cycle overflows: green budget {} + base red {}",
                green_budget, params.base_red
            ))
        })?;
        let total = counts.total();
        let lanes = counts.len() as u64;
        let budget = u64::from(green_budget);

        let per_lane = counts
            .lanes()
            .iter()
            .map(|&count| {
                let raw = if total > 0 {
                    budget * u64::from(count) / total
                } else {
                    budget / lanes
                };
                params.lane_timing(params.clamp_green(raw), local_cycle)
            })
            .collect::<TrafficResult<Vec<_>>>()?;

        Ok(TimingPlan {
            per_lane,
            cycle_length: local_cycle,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalFactorAllocator;

impl SignalTimingAllocator for GlobalFactorAllocator {
    fn name(&self) -> &'static str {
        "global_factor"
    }

    fn allocate(
        &self,
        counts: &CountVector,
        label: CongestionLabel,
        params: &TimingParams,
    ) -> TrafficResult<TimingPlan> {
        params.validate()?;
        params.check_counts(counts)?;

        let factor = params.global_factor.factor(counts.total());
        let raw = (f64::from(params.green_budget(label)) * factor).floor() as u64;
        let green = params.clamp_green(raw);
        let cycle_length = green
            .checked_add(params.yellow)
            .and_then(|partial| partial.checked_add(params.base_red))
            .ok_or_else(|| {
                TrafficError::InvalidParams(format!(
                    "cycle overflows: green {} + yellow {} + base red {}",
                    green, params.yellow, params.base_red
                ))
            })?;
        let timing = params.lane_timing(green, cycle_length)?;

        Ok(TimingPlan {
            per_lane: vec![timing; counts.len()],
            cycle_length,
        })
    }
}

/// Allocates with the strategy selected in `params`.
pub fn allocate(
    counts: &CountVector,
    label: CongestionLabel,
    params: &TimingParams,
) -> TrafficResult<TimingPlan> {
    let allocator = params.strategy.allocator();
    let plan = allocator.allocate(counts, label, params)?;
    LogManager::new("trafficcore::allocator").record(&format!(
        "{} allocation for {} ({}) -> cycle {}s",
        allocator.name(),
        counts,
        label,
        plan.cycle_length
    ));
    Ok(plan)
}
