//! Hash-based value noise, a CPU port of the grid shader's noise chain.
//!
//! The hash, the Hermite smoothing, and the octave schedule must match the
//! GLSL side exactly; this is the half of the terrain formula that the
//! simulation shares with the renderer.

fn fract(v: f32) -> f32 {
    v - v.floor()
}

/// The classic sin-dot lattice hash. Returns a value in [0, 1).
fn hash(x: f32, y: f32) -> f32 {
    fract((x * 12.9898 + y * 78.233).sin() * 43758.5453)
}

/// 2D value noise with cubic Hermite smoothing between lattice corners.
pub fn value_noise(x: f32, y: f32) -> f32 {
    let ix = x.floor();
    let iy = y.floor();
    let fx = fract(x);
    let fy = fract(y);

    let ux = fx * fx * (3.0 - 2.0 * fx);
    let uy = fy * fy * (3.0 - 2.0 * fy);

    let a = hash(ix, iy);
    let b = hash(ix + 1.0, iy);
    let c = hash(ix, iy + 1.0);
    let d = hash(ix + 1.0, iy + 1.0);

    (a * (1.0 - ux) + b * ux) * (1.0 - uy) + (c * (1.0 - ux) + d * ux) * uy
}

/// 3-octave fractal value noise, animated by scrolling the sample domain
/// with time. Frequency doubles and amplitude halves per octave.
pub fn fbm(x: f32, y: f32, t: f32, base_frequency: f32, wave_speed: f32) -> f32 {
    let mut total = 0.0;
    let mut amp = 1.0;
    let mut freq = base_frequency;
    let tx = t * wave_speed;
    let ty = t * wave_speed * 0.5;

    for _ in 0..3 {
        total += value_noise(x * freq + tx, y * freq + ty) * amp;
        freq *= 2.0;
        amp *= 0.5;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_bounded() {
        for i in 0..100 {
            let x = i as f32 * 1.7 - 50.0;
            let y = i as f32 * -3.3 + 12.0;
            let h = hash(x, y);
            assert_eq!(h, hash(x, y));
            assert!((0.0..1.0).contains(&h), "hash out of range: {h}");
        }
    }

    #[test]
    fn value_noise_interpolates_corners() {
        // At integer lattice points the noise equals the corner hash.
        assert!((value_noise(3.0, 7.0) - hash(3.0, 7.0)).abs() < 1e-5);
    }

    #[test]
    fn value_noise_bounded() {
        for i in 0..200 {
            let v = value_noise(i as f32 * 0.37, i as f32 * 0.91);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn fbm_three_octaves_bounded() {
        // Amplitudes 1 + 0.5 + 0.25 bound the sum.
        for i in 0..100 {
            let v = fbm(i as f32 * 2.1, i as f32 * -1.3, 5.0, 0.015, 0.2);
            assert!((0.0..=1.75).contains(&v), "fbm out of range: {v}");
        }
    }

    #[test]
    fn fbm_scrolls_with_time() {
        let a = fbm(10.0, 10.0, 0.0, 0.015, 0.2);
        let b = fbm(10.0, 10.0, 100.0, 0.015, 0.2);
        assert_ne!(a, b);
    }
}
