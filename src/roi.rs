use serde::Serialize;

pub const WEEKS_PER_YEAR: f64 = 50.0;
pub const REDUCTION_RATE: f64 = 0.9;
pub const AGENT_MONTHLY_COST: f64 = 500.0;

pub const HOURS_RANGE: (u32, u32) = (5, 100);
pub const RATE_RANGE: (u32, u32) = (10, 100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiResults {
    pub hours_per_week: u32,
    pub hourly_rate: u32,
    pub annual_hours_saved: u64,
    pub annual_cost_saved: u64,
    pub roi_percentage: u64,
    pub payback_weeks: u64,
}

/// Yearly savings of handing `hours_per_week` of work at `hourly_rate` to an agent.
/// Inputs outside the supported ranges are clamped.
pub fn calculate(hours_per_week: u32, hourly_rate: u32) -> RoiResults {
    let hours = hours_per_week.clamp(HOURS_RANGE.0, HOURS_RANGE.1);
    let rate = hourly_rate.clamp(RATE_RANGE.0, RATE_RANGE.1);
    let (h, r) = (hours as f64, rate as f64);

    let annual_hours_saved = (h * WEEKS_PER_YEAR * REDUCTION_RATE).round();
    let annual_cost_saved = (annual_hours_saved * r).round();
    let annual_agent_cost = AGENT_MONTHLY_COST * 12.0;
    let roi = ((annual_cost_saved - annual_agent_cost) / annual_agent_cost * 100.0).round();
    let payback = (AGENT_MONTHLY_COST / (h * r * REDUCTION_RATE / 4.0) * 4.0).round();

    RoiResults {
        hours_per_week: hours,
        hourly_rate: rate,
        annual_hours_saved: annual_hours_saved as u64,
        annual_cost_saved: annual_cost_saved as u64,
        roi_percentage: roi.max(0.0) as u64,
        payback_weeks: payback.max(1.0) as u64,
    }
}
