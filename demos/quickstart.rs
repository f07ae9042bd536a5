use stardate::{Calendar, Settings, StarDate, Zone};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let now = StarDate::now();
    println!("now:        {now}");
    println!("JD:         {}", now.to_julian_string());
    println!("decimal y:  {}", now.decimal_years());

    let calendar = Calendar::new(Settings::from_env().with_zone(Zone::US_PACIFIC));
    match calendar.parse("1997 Apr 1.034170") {
        Ok(new_moon) => {
            println!("new moon:   {new_moon} (JD {})", new_moon.to_julian_string());
            println!("moon age:   {:.2} days", now.days_since(&new_moon) % 29.530588853);
        }
        Err(err) => eprintln!("{err}"),
    }
}
