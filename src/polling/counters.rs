/// Counter-rollover-aware delta, per spec.md §4.6: on a 32-bit counter
/// a decrease from `previous` to `current` is treated as a rollover,
/// `delta = current + (2^32 - previous)`. HC counters use the 64-bit
/// modulus the same way.
pub fn delta_u32(previous: u32, current: u32) -> u64 {
    if current >= previous {
        (current - previous) as u64
    } else {
        current as u64 + (u32::MAX as u64 + 1 - previous as u64)
    }
}

pub fn delta_u64(previous: u64, current: u64) -> u64 {
    if current >= previous {
        current - previous
    } else {
        current.wrapping_add(u64::MAX - previous + 1)
    }
}

/// Generic delta over the `u64` counter columns the data model uses
/// throughout (see SPEC_FULL.md §9's "all traffic counters are u64"
/// resolution); rollover is computed against the 32-bit modulus unless
/// the value plainly exceeds that range, in which case it is treated
/// as already a 64-bit (HC) counter.
pub fn delta(previous: u64, current: u64) -> u64 {
    if current >= previous {
        return current - previous;
    }
    if previous <= u32::MAX as u64 {
        delta_u32(previous as u32, current as u32)
    } else {
        delta_u64(previous, current)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceDeltas {
    pub in_octets: u64,
    pub out_octets: u64,
    pub in_errors: u64,
    pub out_errors: u64,
    pub in_discards: u64,
    pub out_discards: u64,
    pub in_ucast: u64,
    pub out_ucast: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceRates {
    pub in_utilization: f64,
    pub out_utilization: f64,
    pub utilization: f64,
    pub error_rate: f64,
    pub discard_rate: f64,
}

/// Computes utilization/error-rate/discard-rate from a delta over a
/// wall-clock interval, per spec.md §4.6's counter math.
pub fn compute_rates(deltas: &InterfaceDeltas, dt_s: f64, speed_bps: Option<u64>) -> InterfaceRates {
    if dt_s <= 0.0 {
        return InterfaceRates::default();
    }
    let speed = speed_bps.unwrap_or(0) as f64;
    let in_utilization = if speed > 0.0 {
        ((deltas.in_octets as f64 * 8.0 / dt_s) / speed * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    let out_utilization = if speed > 0.0 {
        ((deltas.out_octets as f64 * 8.0 / dt_s) / speed * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    let utilization = in_utilization.max(out_utilization);

    let ucast_total = deltas.in_ucast + deltas.out_ucast;
    let error_rate = if ucast_total > 0 {
        ((deltas.in_errors + deltas.out_errors) as f64 / ucast_total as f64) * 100.0
    } else {
        0.0
    };
    let discard_rate = if ucast_total > 0 {
        ((deltas.in_discards + deltas.out_discards) as f64 / ucast_total as f64) * 100.0
    } else {
        0.0
    };

    InterfaceRates {
        in_utilization,
        out_utilization,
        utilization,
        error_rate,
        discard_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utilization_without_rollover() {
        // scenario 2: speed 1e9, t=0 in_octets=900_000_000, t=300 in_octets=1_000_000_000
        let deltas = InterfaceDeltas {
            in_octets: delta(900_000_000, 1_000_000_000),
            ..Default::default()
        };
        let rates = compute_rates(&deltas, 300.0, Some(1_000_000_000));
        assert!((rates.in_utilization - 0.2667).abs() < 1e-3);
    }

    #[test]
    fn counter_rollover_delta() {
        // scenario 3: t=0 in_octets = 2^32 - 1000, t=10 in_octets = 1000
        let previous = u32::MAX - 999;
        let current = 1000u32;
        let d = delta_u32(previous, current);
        assert_eq!(d, 2000);

        let rates = compute_rates(
            &InterfaceDeltas {
                in_octets: d,
                ..Default::default()
            },
            10.0,
            Some(1_000_000_000),
        );
        assert!((rates.in_utilization - 0.00016).abs() < 1e-5);
    }

    #[test]
    fn error_rate_uses_ucast_denominator() {
        let deltas = InterfaceDeltas {
            in_errors: 5,
            out_errors: 5,
            in_ucast: 500,
            out_ucast: 500,
            ..Default::default()
        };
        let rates = compute_rates(&deltas, 60.0, Some(1_000_000_000));
        assert!((rates.error_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_interval_yields_zero_rates() {
        let rates = compute_rates(&InterfaceDeltas::default(), 0.0, Some(1_000_000_000));
        assert_eq!(rates.utilization, 0.0);
    }

    #[test]
    fn rollover_on_32_bit_counter() {
        let previous: u32 = 4_000_000_000;
        let current: u32 = 100_000;
        let expected = current as u64 + (2u64.pow(32) - previous as u64);
        assert_eq!(delta_u32(previous, current), expected);
    }
}
