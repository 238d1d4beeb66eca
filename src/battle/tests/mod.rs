mod common;

#[cfg(test)]
mod test_attack;

#[cfg(test)]
mod test_capture;
