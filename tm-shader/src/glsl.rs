//! The GLSL source of the foliage program.
//!
//! The program is written against the conventions of a three.js style `ShaderMaterial`: the
//! renderer supplies `position`, `modelViewMatrix`, and `projectionMatrix`, and expands the
//! `#include` chunks for tone mapping and colour space conversion.

/// The vertex stage of the foliage program.
pub const FOLIAGE_VERTEX_SHADER: &str = r#"
uniform float uTime;
uniform float uMorph;
uniform float uBreatheAmplitude;
uniform float uBreatheRestAmplitude;
uniform float uBreatheFrequency;
uniform float uSwirlStrength;

attribute vec3 aTreePos;
attribute vec3 aScatterPos;
attribute float aRandom;

varying float vAlpha;
varying float vSparkle;

float easeInOutCubic(float x) {
    return x < 0.5 ? 4.0 * x * x * x : 1.0 - pow(-2.0 * x + 2.0, 3.0) / 2.0;
}

void main() {
    float t = easeInOutCubic(clamp(uMorph, 0.0, 1.0));
    vec3 pos = mix(aScatterPos, aTreePos, t);

    float breatheIntensity = mix(uBreatheAmplitude, uBreatheRestAmplitude, t);
    float breathe = sin(uTime * uBreatheFrequency + aRandom * 10.0) * breatheIntensity;
    if (length(pos) > 0.0) {
        pos += breathe * normalize(pos);
    }

    float swirlStrength = (1.0 - t) * t * uSwirlStrength;
    float swirlAngle = swirlStrength * (aRandom - 0.5) * 2.0;
    float c = cos(swirlAngle);
    float s = sin(swirlAngle);
    pos.xz = mat2(c, -s, s, c) * pos.xz;

    vec4 mvPosition = modelViewMatrix * vec4(pos, 1.0);

    float sizeRandom = 90.0 * aRandom + 40.0;
    gl_PointSize = sizeRandom * (1.0 / -mvPosition.z);

    vSparkle = sin(uTime * 2.0 + aRandom * 25.0);
    vAlpha = 0.8 + 0.2 * vSparkle;

    gl_Position = projectionMatrix * mvPosition;
}
"#;

/// The fragment stage of the foliage program.
pub const FOLIAGE_FRAGMENT_SHADER: &str = r#"
uniform vec3 uColorHigh;
uniform vec3 uColorBase;
uniform float uGlowIntensity;

varying float vAlpha;
varying float vSparkle;

void main() {
    vec2 center = gl_PointCoord - 0.5;
    float dist = length(center);
    if (dist > 0.5) discard;

    float core = smoothstep(0.5, 0.2, dist);
    float rimFactor = smoothstep(0.35, 0.5, dist);

    // Overdriving the highlight above 1.0 is what lets bloom pick up the rim
    vec3 glowColor = uColorHigh * uGlowIntensity;
    vec3 finalColor = mix(uColorBase, glowColor, rimFactor * 0.95);

    float sparkleMix = smoothstep(0.0, 1.0, vSparkle) * 0.3;
    finalColor = mix(finalColor, glowColor, sparkleMix);

    gl_FragColor = vec4(finalColor, vAlpha * core);

    #include <tonemapping_fragment>
    #include <colorspace_fragment>
}
"#;
