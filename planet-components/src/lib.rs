//! Vertical diffusion components for planetary atmospheres
//!
//! Components take the immutable inputs from `planet-core` and compute,
//! level by level, the composition of the column and the molecular, eddy and
//! net diffusion terms of each neutral species.

pub mod components;
