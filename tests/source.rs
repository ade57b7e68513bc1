mod common;

mod tests {
    use embassy_time::Instant;
    use light_patchbay::SourceId;
    use light_patchbay::source::{LEVEL_MAX, Random, SourceTable};

    use super::common::FakeBoard;

    const SEED: u64 = 42;

    #[test]
    fn test_fixed_constants() {
        let mut sources = SourceTable::<3>::new(SEED);
        assert_eq!(sources.get(SourceId::OFF), 0);
        assert_eq!(sources.get(SourceId::ON), LEVEL_MAX);
        assert_eq!(sources.get(SourceId::HALF), 512);

        sources.set(SourceId::OFF, 700);
        sources.set(SourceId::ON, 0);
        assert_eq!(sources.get(SourceId::OFF), 0);
        assert_eq!(sources.get(SourceId::ON), LEVEL_MAX);
    }

    #[test]
    fn test_constant_pseudo_sources_ignore_table() {
        let mut sources = SourceTable::<3>::new(SEED);
        for slot in 3..19 {
            sources.set(SourceId::from_raw(slot), 777);
        }
        for raw in 0x80..=0xFF_u8 {
            let id = SourceId::from_raw(raw);
            assert!(id.is_constant());
            assert_eq!(sources.get(id), u16::from(raw & 0x7F) << 3);
        }
        assert_eq!(SourceId::constant(0x7F).raw(), 0xFF);
        assert_eq!(sources.get(SourceId::constant(64)), 512);
    }

    #[test]
    fn test_set_clamps() {
        let mut sources = SourceTable::<3>::new(SEED);
        sources.set(SourceId::REMOTE1, 5000);
        assert_eq!(sources.get(SourceId::REMOTE1), LEVEL_MAX);
        sources.set(SourceId::mask(2), 300);
        assert_eq!(sources.get(SourceId::mask(2)), 300);
        assert_eq!(sources.mask_slots(), &[0, 0, 300]);
    }

    #[test]
    #[should_panic]
    fn test_index_past_table_panics() {
        let sources = SourceTable::<3>::new(SEED);
        let _ = sources.get(SourceId::mask(3));
    }

    #[test]
    fn test_refresh_samples_analog_inputs() {
        let mut sources = SourceTable::<3>::new(SEED);
        let mut board = FakeBoard {
            audio: 10,
            levels: [100, 200, 2000],
            ..FakeBoard::default()
        };
        sources.refresh(&mut board, Instant::from_millis(0));
        assert_eq!(sources.get(SourceId::AUDIO), 10);
        assert_eq!(sources.get(SourceId::LEVEL1), 100);
        assert_eq!(sources.get(SourceId::LEVEL2), 200);
        assert_eq!(sources.get(SourceId::LEVEL3), LEVEL_MAX);
    }

    #[test]
    fn test_random_refresh_periods() {
        let mut expected = Random::new(SEED);
        let first_fast = expected.next_level();
        let first_slow = expected.next_level();
        let second_fast = expected.next_level();
        let third_fast = expected.next_level();

        let mut sources = SourceTable::<3>::new(SEED);
        let mut board = FakeBoard::default();

        sources.refresh(&mut board, Instant::from_millis(0));
        assert_eq!(sources.get(SourceId::RANDOM_FAST), first_fast);
        assert_eq!(sources.get(SourceId::RANDOM_SLOW), first_slow);

        sources.refresh(&mut board, Instant::from_millis(999));
        assert_eq!(sources.get(SourceId::RANDOM_FAST), first_fast);

        sources.refresh(&mut board, Instant::from_millis(1_000));
        assert_eq!(sources.get(SourceId::RANDOM_FAST), second_fast);
        assert_eq!(sources.get(SourceId::RANDOM_SLOW), first_slow);

        sources.refresh(&mut board, Instant::from_millis(2_000));
        assert_eq!(sources.get(SourceId::RANDOM_FAST), third_fast);
        assert_eq!(sources.get(SourceId::RANDOM_SLOW), first_slow);
    }

    #[test]
    fn test_random_stays_in_range() {
        let mut random = Random::new(7);
        for _ in 0..10_000 {
            assert!(random.next_level() <= LEVEL_MAX);
        }
    }

    #[test]
    fn test_step_button_press_edges() {
        let mut sources = SourceTable::<3>::new(SEED);
        let mut board = FakeBoard::default();
        let now = Instant::from_millis(0);

        board.buttons[0] = true;
        sources.refresh(&mut board, now);
        sources.refresh(&mut board, now);
        assert_eq!(sources.get(SourceId::STEP1), 128);

        board.buttons[0] = false;
        sources.refresh(&mut board, now);
        board.buttons[0] = true;
        sources.refresh(&mut board, now);
        assert_eq!(sources.get(SourceId::STEP1), 256);
        assert_eq!(sources.get(SourceId::STEP2), 0);
    }

    #[test]
    fn test_step_wraps_after_top() {
        let mut sources = SourceTable::<3>::new(SEED);
        sources.set(SourceId::STEP3, 960);
        sources.step(SourceId::STEP3);
        assert_eq!(sources.get(SourceId::STEP3), LEVEL_MAX);
        sources.step(SourceId::STEP3);
        assert_eq!(sources.get(SourceId::STEP3), 0);
    }

    #[test]
    fn test_adjustable_ranges() {
        assert!(SourceId::STEP1.is_adjustable());
        assert!(SourceId::REMOTE3.is_adjustable());
        assert!(!SourceId::OSCILLATOR.is_adjustable());
        assert!(SourceId::STEP3.is_stepped());
        assert!(!SourceId::REMOTE1.is_stepped());
    }
}
