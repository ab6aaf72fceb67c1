#[cfg(test)]
mod common;




#[cfg(test)]
mod timetable_invariant_tests;

#[cfg(test)]
mod next_business_day_tests;
