use glam::Vec3;

/// Hash float to [0,1] - port of GLSL hash11
pub fn hash11(p: f32) -> f32 {
    let mut p = (p * 0.1031).fract();
    p *= p + 33.33;
    p *= p + p;
    p.fract()
}

/// Smooth interpolation - port of GLSL smoothstep
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// GLSL-style `mix(a, b, t)` for scalars.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Sine ease-in-out on [0,1].
pub fn ease_in_out_sine(t: f32) -> f32 {
    -((std::f32::consts::PI * t.clamp(0.0, 1.0)).cos() - 1.0) / 2.0
}

/// Convert a packed `0xRRGGBB` color into linear-ish [0,1] RGB.
pub fn rgb_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Clamp the length of `v` to `max_len`. Non-positive limits disable clamping.
pub fn clamp_length(v: Vec3, max_len: f32) -> Vec3 {
    if max_len <= 0.0 {
        return v;
    }
    let len = v.length();
    if len > max_len {
        v * (max_len / len)
    } else {
        v
    }
}

/// Direction from `from` to `to`, or zero when the points coincide.
pub fn direction(from: Vec3, to: Vec3) -> Vec3 {
    (to - from).normalize_or_zero()
}
