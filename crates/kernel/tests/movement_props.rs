//! Property tests for the movement integrator driven through the gateway.

use std::time::Duration;

use proptest::prelude::*;
use simcore_kernel::{Game, PeerId, Position, PositionOf, Teleport, SetVelocity, Velocity};

/// Finite values in a range where `p + v*dt` stays well inside f32 precision.
fn finite_f32() -> impl Strategy<Value = f32> {
    (-100_000i32..100_000i32).prop_map(|v| v as f32 * 0.01)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn one_tick_integrates_position_by_velocity(
        px in finite_f32(), py in finite_f32(),
        vx in finite_f32(), vy in finite_f32(),
        dt_ms in 0u64..1_000,
    ) {
        let game = Game::default();
        let entity = game.spawn_player_character(PeerId(1)).unwrap();
        game.command(Teleport { entity, position: Position::new(px, py) }).unwrap();
        game.command(SetVelocity { entity, velocity: Velocity::new(vx, vy) }).unwrap();

        let delta = Duration::from_millis(dt_ms);
        game.step(delta).unwrap();

        let dt = delta.as_secs_f32();
        let expected_x = px + vx * dt;
        let expected_y = py + vy * dt;
        let p = game.query(PositionOf(entity)).unwrap();
        let tolerance = 1e-3_f32.max(expected_x.abs().max(expected_y.abs()) * 1e-6);
        prop_assert!((p.0.x - expected_x).abs() <= tolerance, "x: {} vs {}", p.0.x, expected_x);
        prop_assert!((p.0.y - expected_y).abs() <= tolerance, "y: {} vs {}", p.0.y, expected_y);
    }

    #[test]
    fn entities_move_independently(count in 1usize..20, dt_ms in 1u64..500) {
        let game = Game::default();
        let entities: Vec<_> = (0..count)
            .map(|i| {
                let entity = game.spawn_player_character(PeerId(i as i32)).unwrap();
                game.command(SetVelocity { entity, velocity: Velocity::new(i as f32, -(i as f32)) })
                    .unwrap();
                entity
            })
            .collect();

        game.step(Duration::from_millis(dt_ms)).unwrap();

        let dt = Duration::from_millis(dt_ms).as_secs_f32();
        for (i, entity) in entities.into_iter().enumerate() {
            let p = game.query(PositionOf(entity)).unwrap();
            prop_assert_eq!(p, Position::new(i as f32 * dt, -(i as f32) * dt));
        }
    }
}
