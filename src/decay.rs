use crate::error::{Error, Result};

/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f32) -> f32;
}

fn validate(rate: f32, vi: f32, vf: f32) -> Result<()> {
    ((rate >= 0.0 && vi >= vf) || (rate < 0.0 && vi <= vf))
        .then_some(())
        .ok_or_else(|| Error::Config(String::from("`vi - vf` must have same sign as `rate`")))
}

/// v(t) = max(v<sub>i</sub> - rt, v<sub>f</sub>)
///
/// A schedule built with [`Linear::over`] is exactly `vf` from its final step on.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    rate: f32,
    vi: f32,
    vf: f32,
    until: f32,
}

impl Linear {
    pub fn new(rate: f32, vi: f32, vf: f32) -> Result<Self> {
        validate(rate, vi, vf)?;
        Ok(Self {
            rate,
            vi,
            vf,
            until: f32::INFINITY,
        })
    }

    /// A schedule that moves from `vi` to `vf` over `steps` time units and then holds at `vf`
    pub fn over(steps: usize, vi: f32, vf: f32) -> Result<Self> {
        let steps = steps.max(1) as f32;
        Ok(Self {
            until: steps,
            ..Self::new((vi - vf) / steps, vi, vf)?
        })
    }
}

impl Decay for Linear {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { rate, vi, vf, until } = self;
        if t >= until {
            vf
        } else {
            (vi - rate * t).max(vf)
        }
    }
}
