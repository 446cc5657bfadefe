#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat rules: fire-rate gating and damage resolution.

use std::time::Duration;

use rand::Rng;
use tower_defence_core::{Armor, ArmorKind, DamageType, Effect, Properties};

/// Multiplier applied to damage of type `damage` striking armor of kind `armor`.
#[must_use]
pub const fn coefficient(damage: DamageType, armor: ArmorKind) -> f32 {
    match (damage, armor) {
        (_, ArmorKind::Unarmored) => 1.0,
        (DamageType::Physical, ArmorKind::Light) => 1.25,
        (DamageType::Physical, ArmorKind::Heavy) => 0.75,
        (DamageType::Physical, ArmorKind::Fortified) => 0.5,
        (DamageType::Fire, ArmorKind::Light) => 1.5,
        (DamageType::Fire, ArmorKind::Heavy) => 1.0,
        (DamageType::Fire, ArmorKind::Fortified) => 0.75,
        (DamageType::Frost, ArmorKind::Light) => 1.0,
        (DamageType::Frost, ArmorKind::Heavy) => 1.25,
        (DamageType::Frost, ArmorKind::Fortified) => 0.75,
        (DamageType::Lightning, ArmorKind::Light) => 0.75,
        (DamageType::Lightning, ArmorKind::Heavy) => 1.5,
        (DamageType::Lightning, ArmorKind::Fortified) => 1.0,
    }
}

/// Result of resolving a single hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageOutcome {
    /// Health deducted from the victim.
    pub amount: f32,
    /// Whether the hit was critical.
    pub critical: bool,
}

/// Resolves the damage dealt by an attack carrying `properties` against `armor`.
///
/// Every populated damage type is rolled uniformly within its `[low, high)`
/// range (degenerate ranges yield `low` without consuming randomness, and
/// ranges with a non-finite bound contribute nothing),
/// scaled by [`coefficient`], and summed. A critical roll happens only when
/// the crit chance is positive. Decaying on-hit damage is added after the
/// crit, and the armor amount is subtracted last.
pub fn resolve_damage<R>(properties: &Properties, armor: Armor, rng: &mut R) -> DamageOutcome
where
    R: Rng + ?Sized,
{
    let mut amount = 0.0_f32;
    for (kind, range) in properties.damage.iter() {
        let raw = if range.is_degenerate() {
            if range.low().is_finite() {
                range.low()
            } else {
                0.0
            }
        } else {
            rng.gen_range(range.low()..range.high())
        };
        amount += raw * coefficient(kind, armor.kind);
    }

    let critical = properties.crit_chance > 0.0 && rng.gen::<f32>() < properties.crit_chance;
    if critical {
        amount *= properties.crit_multiplier;
    }

    for effect in &properties.on_hit {
        if let Effect::DecayingDamage {
            kind,
            amount: extra,
            ..
        } = effect
        {
            amount += extra * coefficient(*kind, armor.kind);
        }
    }

    DamageOutcome {
        amount: (amount - armor.amount).max(0.0),
        critical,
    }
}

/// Damage dealt by an on-death burst to a bystander wearing `armor`.
#[must_use]
pub fn burst_damage(kind: DamageType, amount: f32, armor: Armor) -> f32 {
    (amount * coefficient(kind, armor.kind) - armor.amount).max(0.0)
}

/// Per-tower elapsed-time accumulator gating how often a tower fires.
///
/// The accumulator is capped at one firing period so a tower that idled
/// without a target fires once, not in a burst, when a target appears.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cooldown {
    elapsed: Duration,
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::primed()
    }
}

impl Cooldown {
    /// Cooldown that allows firing on the first tick.
    #[must_use]
    pub const fn primed() -> Self {
        Self {
            elapsed: Duration::MAX,
        }
    }

    /// Accumulates `dt` and reports whether a shot is available.
    pub fn advance(&mut self, dt: Duration, attack_speed: f32) -> bool {
        let Some(period) = firing_period(attack_speed) else {
            return false;
        };
        self.elapsed = self.elapsed.saturating_add(dt).min(period);
        self.elapsed >= period
    }

    /// Consumes one firing period after a shot.
    pub fn trigger(&mut self, attack_speed: f32) {
        if let Some(period) = firing_period(attack_speed) {
            self.elapsed = self.elapsed.saturating_sub(period);
        }
    }
}

/// Time between shots for the attack speed, if the tower can fire at all.
#[must_use]
pub fn firing_period(attack_speed: f32) -> Option<Duration> {
    if attack_speed <= 0.0 || !attack_speed.is_finite() {
        return None;
    }
    Duration::try_from_secs_f32(1.0 / attack_speed).ok()
}
