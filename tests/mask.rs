mod tests {
    use light_patchbay::source::{LEVEL_MAX, SourceTable};
    use light_patchbay::{MaskGenerator, MaskKind, MaskPattern, SourceId};

    const KINDS: [MaskKind; 4] = [
        MaskKind::Single,
        MaskKind::Grow,
        MaskKind::Pass,
        MaskKind::Double,
    ];

    fn generator<const N: usize>(kind: MaskKind) -> MaskGenerator<N> {
        let mut generator = MaskGenerator::new(SourceId::ON);
        generator.set_pattern(MaskPattern::new(kind));
        generator
    }

    fn walk<const N: usize>(generator: &mut MaskGenerator<N>, steps: usize) -> Vec<u16> {
        (0..steps)
            .map(|_| {
                generator.step();
                generator.mask()
            })
            .collect()
    }

    #[test]
    fn test_mask_stays_in_range() {
        for kind in KINDS {
            let mut narrow = generator::<3>(kind);
            let mut wide = generator::<9>(kind);
            let mut triple = generator::<9>(kind);
            triple.set_pattern(MaskPattern::new(kind).triplified());
            for _ in 0..1_000 {
                narrow.step();
                assert!(narrow.mask() >= 1 && narrow.mask() <= 7, "{kind:?}");
                wide.step();
                assert!(wide.mask() >= 1 && wide.mask() <= 511, "{kind:?}");
                triple.step();
                assert!(triple.mask() >= 1 && triple.mask() <= 7, "{kind:?}");
            }
        }
    }

    #[test]
    fn test_single_period() {
        let mut g = generator::<5>(MaskKind::Single);
        assert_eq!(walk(&mut g, 10), [2, 4, 8, 16, 1, 2, 4, 8, 16, 1]);
    }

    #[test]
    fn test_double_period() {
        let mut g = generator::<3>(MaskKind::Double);
        assert_eq!(walk(&mut g, 6), [3, 6, 1, 3, 6, 1]);

        let mut g = generator::<5>(MaskKind::Double);
        assert_eq!(walk(&mut g, 5), [3, 6, 12, 24, 1]);
    }

    #[test]
    fn test_grow_bounces() {
        let mut g = generator::<3>(MaskKind::Grow);
        assert_eq!(walk(&mut g, 8), [3, 7, 3, 1, 3, 7, 3, 1]);
    }

    #[test]
    fn test_pass_bounces() {
        let mut g = generator::<3>(MaskKind::Pass);
        assert_eq!(walk(&mut g, 9), [3, 7, 6, 4, 6, 7, 3, 1, 3]);
    }

    #[test]
    fn test_grow_and_pass_are_symmetric() {
        for kind in [MaskKind::Grow, MaskKind::Pass] {
            let mut g = generator::<6>(kind);
            // Grow turns at the full mask, Pass at the top bit alone
            let turn = if kind == MaskKind::Grow { 63 } else { 32 };
            let mut up = vec![g.mask()];
            while *up.last().unwrap() != turn {
                g.step();
                up.push(g.mask());
            }
            let mut down = vec![*up.last().unwrap()];
            while *down.last().unwrap() != 1 {
                g.step();
                down.push(g.mask());
            }
            up.reverse();
            assert_eq!(up, down, "{kind:?}");
        }
    }

    #[test]
    fn test_counter_steps_once_per_2048() {
        let mut sources = SourceTable::<3>::new(0);
        let mut g = MaskGenerator::<3>::new(SourceId::ON);
        g.set_pattern(MaskPattern::new(MaskKind::Single));

        // 1023 >> 2 = 255 per tick, 9 ticks to pass 2048
        for _ in 0..8 {
            assert!(!g.tick(&mut sources));
        }
        assert!(g.tick(&mut sources));
        assert_eq!(g.mask(), 2);
        assert_eq!(sources.mask_slots(), &[0, LEVEL_MAX, 0]);
    }

    #[test]
    fn test_disabled_never_moves() {
        let mut sources = SourceTable::<3>::new(0);
        let mut g = MaskGenerator::<3>::new(SourceId::ON);
        for _ in 0..100 {
            assert!(!g.tick(&mut sources));
        }
        assert_eq!(g.mask(), 1);
        g.publish(&mut sources);
        assert_eq!(sources.mask_slots(), &[0, 0, 0]);

        // slots written by someone else are left alone
        sources.set(SourceId::mask(2), 700);
        g.publish(&mut sources);
        assert_eq!(sources.mask_slots(), &[0, 0, 700]);
    }

    #[test]
    fn test_triplify_repeats_over_groups() {
        let mut sources = SourceTable::<6>::new(0);
        let mut g = MaskGenerator::<6>::new(SourceId::ON);
        g.set_pattern(MaskPattern::new(MaskKind::Single).triplified());
        assert_eq!(g.run_length(), 3);
        assert_eq!(g.limit(), 7);

        g.publish(&mut sources);
        assert_eq!(sources.mask_slots(), &[LEVEL_MAX, 0, 0, LEVEL_MAX, 0, 0]);

        g.step();
        g.publish(&mut sources);
        assert_eq!(sources.mask_slots(), &[0, LEVEL_MAX, 0, 0, LEVEL_MAX, 0]);
    }

    #[test]
    fn test_pattern_change_resets_state() {
        let mut g = generator::<4>(MaskKind::Grow);
        walk(&mut g, 5);
        g.set_pattern(MaskPattern::new(MaskKind::Pass));
        assert_eq!(g.mask(), 1);
        assert_eq!(g.run_length(), 4);
        assert_eq!(g.limit(), 15);
        assert_eq!(walk(&mut g, 2), [3, 7]);
    }

    #[test]
    fn test_pattern_byte() {
        let pattern = MaskPattern::new(MaskKind::Pass).triplified();
        assert_eq!(pattern.to_byte(), 0x83);
        assert_eq!(MaskPattern::from_byte(0x83), pattern);
        assert_eq!(MaskPattern::from_byte(0x04).kind, MaskKind::Double);
        assert_eq!(MaskPattern::from_byte(0x0E), MaskPattern::DISABLED);
    }
}
