use rpm_spec::SpecFile;
use tracing_subscriber::EnvFilter;

const EXAMPLE: &str = "\
%global forgeurl https://example.org/widgets
Name:           widgets
Version:        1.0
Release:        3
Summary:        Widget toolkit
License:        MIT
URL:            %{forgeurl}
Source0:        %{forgeurl}/archive/v%{version}.tar.gz

%description
Widgets for everyone.

%package doc
Summary:        Documentation for %{name}

%prep
%setup -q

%build
make %{?_smp_mflags}

%install
make install DESTDIR=%{buildroot}

%files
/usr/bin/widget

%files doc
/usr/share/doc/widgets
";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let spec = match std::env::args().nth(1) {
        Some(path) => SpecFile::from_path(path),
        None => SpecFile::parse(EXAMPLE),
    }
    .expect("failed to parse spec file");

    println!("=== Parsed Spec ===");
    println!("Name:     {}", spec.main_name().unwrap_or("-"));
    if let Some(meta) = spec.package_metadata(None) {
        println!("EVR:      {}", meta.evr().unwrap_or_default());
        println!("Summary:  {}", meta.summary.unwrap_or_default());
        println!("URL:      {}", meta.url.unwrap_or_default());
    }
    println!("Source0:  {}", spec.expand("%{S:0}"));

    println!("\n=== Macros ===");
    for (name, value) in spec.macros().iter() {
        println!("  {name} = {value}");
    }

    println!("\n=== Sections ===");
    for (package, sections) in spec.sections() {
        let kinds: Vec<String> = sections.keys().map(|k| k.to_string()).collect();
        println!("  {package}: {}", kinds.join(" "));
    }
}
