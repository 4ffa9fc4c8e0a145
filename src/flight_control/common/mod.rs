pub(crate) mod geo_math;
pub(crate) mod location;
pub(crate) mod math;
#[cfg(test)]
mod tests;
