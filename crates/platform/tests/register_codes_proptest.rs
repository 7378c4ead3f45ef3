//! Property-based tests for register unit conversions.
//! Verifies invariants hold for ALL inputs, not just fixed examples.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use platform::bq25895::{
    decode_battery_voltage, encode_input_current, BOOSTV_FIELD, BOOST_MV, SYS_MIN_FIELD,
    SYS_MIN_MV,
};
use platform::peripheral::RegisterField;

proptest::proptest! {
    /// Ceiling encoding never undershoots and overshoots by less than one step.
    #[test]
    fn boost_ceil_meets_or_exceeds_request(mv in 4550u32..=5510u32) {
        let code = BOOST_MV.encode_ceil(mv).unwrap();
        let back = BOOST_MV.decode(code);
        assert!(back >= mv, "{mv} mV encoded to {back} mV");
        assert!(back < mv + BOOST_MV.step);
    }

    /// Floor encoding never exceeds the request.
    #[test]
    fn sys_min_floor_never_exceeds_request(mv in 3000u32..=3700u32) {
        let code = SYS_MIN_MV.encode_floor(mv).unwrap();
        let back = SYS_MIN_MV.decode(code);
        assert!(back <= mv);
        assert!(mv - back < SYS_MIN_MV.step);
    }

    /// Out-of-range requests are rejected, never saturated.
    #[test]
    fn sys_min_rejects_outside_range(mv in proptest::prop_oneof![0u32..3000, 3701u32..=u32::MAX]) {
        assert!(SYS_MIN_MV.encode_floor(mv).is_err());
    }

    /// Field insertion only touches the field bits.
    #[test]
    fn field_insert_preserves_other_bits(reg in proptest::num::u8::ANY, code in 0u8..16) {
        for field in [BOOSTV_FIELD, SYS_MIN_FIELD, RegisterField { shift: 0, mask: 0x3F }] {
            let out = field.insert(reg, code);
            let outside = !(field.mask << field.shift);
            assert_eq!(out & outside, reg & outside);
            assert_eq!(field.extract(out), code & field.mask);
        }
    }

    /// Input current codes always fit the 6-bit IINLIM field, and every
    /// request the field can hold is accepted.
    #[test]
    fn input_current_code_fits_field(ma in 0u32..=3400u32) {
        let representable = ma == 0 || (50..=3249).contains(&ma);
        match encode_input_current(ma) {
            Ok(code) => {
                assert!(representable, "{ma} mA accepted");
                assert!(code <= 0x3F);
            }
            Err(_) => assert!(!representable, "{ma} mA rejected"),
        }
    }

    /// The status bit never changes the battery reading.
    #[test]
    fn battery_decode_ignores_bit7(raw in proptest::num::u8::ANY) {
        let a = decode_battery_voltage(raw);
        let b = decode_battery_voltage(raw & 0x7F);
        assert!((a - b).abs() < 1e-6);
        assert!((2.304..=4.845).contains(&a));
    }
}
