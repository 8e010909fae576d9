use chrono::{DateTime, Duration, Utc};

/// Refinement tolerance for every search.
pub const FINE_STEP: Duration = Duration::seconds(1);

/// A threshold crossing of a sampled function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub at: DateTime<Utc>,
    pub rising: bool,
}

/// Sampled extremum of a function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Maximum {
    pub at: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub crossings: Vec<Crossing>,
    pub maxima: Vec<Maximum>,
}

/// Sample `f` every `step` over `[start, end]` (end always included),
/// bisect every crossing of `threshold` and, when `find_maxima` is set,
/// refine every interior local maximum.
pub fn scan<F, E>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
    threshold: f64,
    find_maxima: bool,
    mut f: F,
) -> Result<ScanResult, E>
where
    F: FnMut(DateTime<Utc>) -> Result<f64, E>,
{
    let mut result = ScanResult::default();
    if end <= start {
        return Ok(result);
    }

    let mut times = Vec::new();
    let mut cursor = start;
    while cursor < end {
        times.push(cursor);
        cursor += step;
    }
    times.push(end);

    let values = times
        .iter()
        .map(|t| f(*t))
        .collect::<Result<Vec<_>, _>>()?;

    for i in 1..times.len() {
        let before = values[i - 1] >= threshold;
        let after = values[i] >= threshold;
        if before != after {
            let at = refine_crossing(&mut f, times[i - 1], times[i], threshold, after)?;
            result.crossings.push(Crossing { at, rising: after });
        }

        if find_maxima
            && i + 1 < times.len()
            && values[i - 1] < values[i]
            && values[i] >= values[i + 1]
        {
            let max = refine_maximum(&mut f, times[i - 1], times[i + 1])?;
            result.maxima.push(max);
        }
    }

    Ok(result)
}

/// Binary search between two samples that straddle `threshold`.
fn refine_crossing<F, E>(
    f: &mut F,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
    threshold: f64,
    rising: bool,
) -> Result<DateTime<Utc>, E>
where
    F: FnMut(DateTime<Utc>) -> Result<f64, E>,
{
    let mut low = before;
    let mut high = after;

    while high - low > FINE_STEP {
        let mid = low + (high - low) / 2;
        let above = f(mid)? >= threshold;
        if above == rising {
            high = mid;
        } else {
            low = mid;
        }
    }

    Ok(high)
}

/// Ternary search for the peak of a unimodal stretch.
fn refine_maximum<F, E>(
    f: &mut F,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
) -> Result<Maximum, E>
where
    F: FnMut(DateTime<Utc>) -> Result<f64, E>,
{
    let mut low = before;
    let mut high = after;

    while high - low > FINE_STEP {
        let third = (high - low) / 3;
        let m1 = low + third;
        let m2 = high - third;
        if f(m1)? < f(m2)? {
            low = m1;
        } else {
            high = m2;
        }
    }

    let at = low + (high - low) / 2;
    Ok(Maximum { at, value: f(at)? })
}
