mod engine;
mod selection;
