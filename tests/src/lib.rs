#![cfg(test)]
mod support;

mod cancellation;
mod pipeline;
