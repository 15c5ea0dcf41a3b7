mod assignment_test;
mod hall_of_fame_test;
mod health_test;
mod registry_test;
mod submissions_test;
