/*
 * Use this file if you want to extract helpers from your solutions.
 * Example import from this file: `use valve_planner::helpers::parse;`.
 */

pub mod parse;
