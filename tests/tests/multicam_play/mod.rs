mod attachment;
mod drift;
mod scenarios;
