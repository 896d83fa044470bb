pub mod operation;
pub mod request_common;

#[cfg(test)]
mod tests;
