//! Default value functions for serde deserialization.

use std::f64::consts::FRAC_PI_2;

pub fn frame_width() -> usize {
    160
}

pub fn frame_height() -> usize {
    120
}

pub fn odometry_window() -> usize {
    80
}

pub fn translation_scale() -> f64 {
    10.0
}

pub fn rotation_scale() -> f64 {
    1.0
}

pub fn view_cell_window() -> usize {
    25
}

pub fn view_cell_threshold() -> f64 {
    0.3
}

pub fn active_decay() -> f64 {
    1.0
}

pub fn dim_xy() -> usize {
    61
}

pub fn dim_th() -> usize {
    36
}

pub fn excite_dim() -> usize {
    7
}

pub fn excite_var() -> f64 {
    1.0
}

pub fn inhibit_dim() -> usize {
    5
}

pub fn inhibit_var() -> f64 {
    2.0
}

pub fn global_inhibition() -> f64 {
    0.00002
}

pub fn inject_energy() -> f64 {
    0.1
}

pub fn vtrans_scaling() -> f64 {
    0.1
}

pub fn decode_radius() -> usize {
    3
}

pub fn delta_pc_threshold() -> f64 {
    1.0
}

pub fn correction() -> f64 {
    0.5
}

pub fn loops() -> usize {
    100
}

pub fn initial_heading() -> f64 {
    FRAC_PI_2
}

pub fn queue_capacity() -> usize {
    1
}
