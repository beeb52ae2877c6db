//! Template file set: one optional template per solver input role.
//!
//! A role whose file name ends in `.T` (and the turbine role itself) is
//! stamped once per turbine as `<stem>_T<id><ext>`; every other role is
//! stamped once per case under its own file name. TurbSim roles are not
//! stamped here; the box generators render them.

use crate::template::{Template, TokenScope};
use ff_core::{FfError, FfResult, TurbineId};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateRole {
    ElastoDyn,
    SimplifiedElastoDyn,
    HydroDyn,
    MoorDyn,
    SeaState,
    ServoDyn,
    AeroDyn,
    AeroDisk,
    SubDyn,
    InflowWind,
    BeamDyn,
    Blade,
    Tower,
    Turbine,
    ControllerInput,
    CoeffTable,
    FastFarm,
    TurbSimLow,
    TurbSimHigh,
}

impl TemplateRole {
    pub const ALL: [TemplateRole; 19] = [
        Self::ElastoDyn,
        Self::SimplifiedElastoDyn,
        Self::HydroDyn,
        Self::MoorDyn,
        Self::SeaState,
        Self::ServoDyn,
        Self::AeroDyn,
        Self::AeroDisk,
        Self::SubDyn,
        Self::InflowWind,
        Self::BeamDyn,
        Self::Blade,
        Self::Tower,
        Self::Turbine,
        Self::ControllerInput,
        Self::CoeffTable,
        Self::FastFarm,
        Self::TurbSimLow,
        Self::TurbSimHigh,
    ];

    /// Configuration key of the role.
    pub fn key(self) -> &'static str {
        match self {
            Self::ElastoDyn => "elastodyn",
            Self::SimplifiedElastoDyn => "simplified_elastodyn",
            Self::HydroDyn => "hydrodyn",
            Self::MoorDyn => "moordyn",
            Self::SeaState => "seastate",
            Self::ServoDyn => "servodyn",
            Self::AeroDyn => "aerodyn",
            Self::AeroDisk => "aerodisk",
            Self::SubDyn => "subdyn",
            Self::InflowWind => "inflowwind",
            Self::BeamDyn => "beamdyn",
            Self::Blade => "blade",
            Self::Tower => "tower",
            Self::Turbine => "turbine",
            Self::ControllerInput => "controller_input",
            Self::CoeffTable => "coeff_table",
            Self::FastFarm => "fastfarm",
            Self::TurbSimLow => "turbsim_low",
            Self::TurbSimHigh => "turbsim_high",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.key() == key)
    }

    /// Token that expands to the stamped file name of this role.
    pub fn file_token(self) -> &'static str {
        match self {
            Self::ElastoDyn => "elastodyn_file",
            Self::SimplifiedElastoDyn => "simplified_elastodyn_file",
            Self::HydroDyn => "hydrodyn_file",
            Self::MoorDyn => "moordyn_file",
            Self::SeaState => "seastate_file",
            Self::ServoDyn => "servodyn_file",
            Self::AeroDyn => "aerodyn_file",
            Self::AeroDisk => "aerodisk_file",
            Self::SubDyn => "subdyn_file",
            Self::InflowWind => "inflowwind_file",
            Self::BeamDyn => "beamdyn_file",
            Self::Blade => "blade_file",
            Self::Tower => "tower_file",
            Self::Turbine => "turbine_file",
            Self::ControllerInput => "controller_input_file",
            Self::CoeffTable => "coeff_table_file",
            Self::FastFarm => "fastfarm_file",
            Self::TurbSimLow => "turbsim_low_file",
            Self::TurbSimHigh => "turbsim_high_file",
        }
    }

    fn turbine_extension(self) -> &'static str {
        match self {
            Self::Turbine => ".fst",
            Self::ControllerInput => ".IN",
            Self::CoeffTable => ".csv",
            _ => ".dat",
        }
    }

    pub fn is_box(self) -> bool {
        matches!(self, Self::TurbSimLow | Self::TurbSimHigh)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateScope {
    PerTurbine,
    Farm,
    LowBox,
    HighBox,
}

impl TemplateScope {
    fn of(role: TemplateRole, name: &str) -> Self {
        match role {
            TemplateRole::TurbSimLow => Self::LowBox,
            TemplateRole::TurbSimHigh => Self::HighBox,
            TemplateRole::FastFarm => Self::Farm,
            TemplateRole::Turbine => Self::PerTurbine,
            _ if name.ends_with(".T") => Self::PerTurbine,
            _ => Self::Farm,
        }
    }

    pub fn tokens(self) -> TokenScope {
        match self {
            Self::PerTurbine => TokenScope::Turbine,
            Self::Farm => TokenScope::Farm,
            Self::LowBox => TokenScope::LowBox,
            Self::HighBox => TokenScope::HighBox,
        }
    }
}

/// Parsed template content. Files that are not UTF-8 are copied verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateBody {
    Text(Template),
    Binary(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    pub role: TemplateRole,
    pub source: PathBuf,
    pub scope: TemplateScope,
    pub body: TemplateBody,
    file_name: String,
}

impl ResolvedTemplate {
    /// Output file name; `turbine` is only consulted for per-turbine files.
    pub fn output_name(&self, turbine: TurbineId) -> String {
        match self.scope {
            TemplateScope::PerTurbine => {
                let stem = match self.file_name.strip_suffix(".T") {
                    Some(stem) => stem,
                    None => Path::new(&self.file_name)
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or(&self.file_name),
                };
                format!("{stem}_{}{}", turbine.file_tag(), self.role.turbine_extension())
            }
            _ => self.file_name.clone(),
        }
    }

    pub fn is_per_turbine(&self) -> bool {
        self.scope == TemplateScope::PerTurbine
    }

    pub fn text(&self) -> Option<&Template> {
        match &self.body {
            TemplateBody::Text(t) => Some(t),
            TemplateBody::Binary(_) => None,
        }
    }
}

/// Roles absent from the set are unused.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateFileSet {
    slots: BTreeMap<TemplateRole, ResolvedTemplate>,
    /// Referenced by path only; never copied or stamped.
    pub controller_library: Option<PathBuf>,
    pub hydro_data: Option<PathBuf>,
}

impl TemplateFileSet {
    /// Resolve every role against `dir`. Roles mapped to `None` stay unused.
    pub fn load<'a>(
        dir: &Path,
        files: impl IntoIterator<Item = (TemplateRole, Option<&'a str>)>,
        controller_library: Option<PathBuf>,
        hydro_data: Option<PathBuf>,
    ) -> FfResult<Self> {
        let mut slots = BTreeMap::new();
        for (role, name) in files {
            let Some(name) = name else {
                continue;
            };
            let source = dir.join(name);
            if !source.is_file() {
                return Err(FfError::MissingTemplate {
                    role: role.key().to_string(),
                    path: source,
                });
            }
            let bytes = fs::read(&source).map_err(|e| {
                FfError::config(format!("cannot read template {}: {e}", source.display()))
            })?;
            let scope = TemplateScope::of(role, name);
            let body = match String::from_utf8(bytes) {
                Ok(text) => {
                    let template = Template::parse(&text).map_err(|e| {
                        FfError::config(format!("template {}: {e}", source.display()))
                    })?;
                    if let Some(token) = template.unknown_token(scope.tokens()) {
                        return Err(FfError::config(format!(
                            "template {} uses token '{token}', which is not available in {} templates",
                            source.display(),
                            scope.tokens().label()
                        )));
                    }
                    TemplateBody::Text(template)
                }
                Err(e) => {
                    if role.is_box() {
                        return Err(FfError::config(format!(
                            "TurbSim template {} is not valid UTF-8",
                            source.display()
                        )));
                    }
                    TemplateBody::Binary(e.into_bytes())
                }
            };
            debug!(role = role.key(), path = %source.display(), "template resolved");
            slots.insert(
                role,
                ResolvedTemplate {
                    role,
                    source,
                    scope,
                    body,
                    file_name: name.to_string(),
                },
            );
        }

        let references = [("controller library", &controller_library), ("hydro data", &hydro_data)];
        for (label, path) in references {
            if let Some(path) = path
                && !path.exists()
            {
                warn!(
                    path = %path.display(),
                    "{label} is referenced but not present on this machine"
                );
            }
        }

        Ok(Self {
            slots,
            controller_library,
            hydro_data,
        })
    }

    /// Every file name a case directory receives for the turbines `ids` must
    /// be distinct, and distinct from the `reserved` names written alongside.
    pub fn check_output_names(&self, ids: &[TurbineId], reserved: &[&str]) -> FfResult<()> {
        let mut seen: BTreeMap<String, String> = reserved
            .iter()
            .map(|name| (name.to_string(), format!("generated '{name}'")))
            .collect();
        for t in self.case_templates() {
            let names: Vec<String> = match (t.is_per_turbine(), ids.first()) {
                (true, _) => ids.iter().map(|id| t.output_name(*id)).collect(),
                (false, Some(id)) => vec![t.output_name(*id)],
                (false, None) => vec![t.file_name.clone()],
            };
            for name in names {
                let owner = format!("role '{}'", t.role.key());
                if let Some(previous) = seen.insert(name.clone(), owner.clone()) {
                    return Err(FfError::write(
                        name,
                        format!("{previous} and {owner} both produce this file"),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, role: TemplateRole) -> Option<&ResolvedTemplate> {
        self.slots.get(&role)
    }

    /// Templates stamped into each case directory (everything but TurbSim).
    pub fn case_templates(&self) -> impl Iterator<Item = &ResolvedTemplate> {
        self.slots.values().filter(|t| !t.role.is_box())
    }

    /// Stamped file name of `role` for `turbine`, or `"unused"`.
    pub fn file_reference(&self, role: TemplateRole, turbine: TurbineId) -> String {
        self.slots
            .get(&role)
            .map(|t| t.output_name(turbine))
            .unwrap_or_else(|| "unused".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn scratch(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("ff-sweep-templates-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn output_names_follow_scope() {
        let dir = scratch("names");
        fs::write(dir.join("ElastoDyn.T"), "BlPitch {{ yaw_deg }}\n").unwrap();
        fs::write(dir.join("Model.fst"), "EDFile \"{{ elastodyn_file }}\"\n").unwrap();
        fs::write(dir.join("AeroDyn.dat"), "WakeMod {{ mod_wake }}\n").unwrap();
        fs::write(dir.join("Cp_Ct_Cq.csv"), [0xff_u8, 0xfe, 0x00]).unwrap();

        let set = TemplateFileSet::load(
            &dir,
            [
                (TemplateRole::ElastoDyn, Some("ElastoDyn.T")),
                (TemplateRole::Turbine, Some("Model.fst")),
                (TemplateRole::AeroDyn, Some("AeroDyn.dat")),
                (TemplateRole::CoeffTable, Some("Cp_Ct_Cq.csv")),
                (TemplateRole::ServoDyn, None),
            ],
            None,
            None,
        )
        .unwrap();

        let t3 = TurbineId::new(3);
        assert_eq!(set.file_reference(TemplateRole::ElastoDyn, t3), "ElastoDyn_T3.dat");
        assert_eq!(set.file_reference(TemplateRole::Turbine, t3), "Model_T3.fst");
        assert_eq!(set.file_reference(TemplateRole::AeroDyn, t3), "AeroDyn.dat");
        assert_eq!(set.file_reference(TemplateRole::ServoDyn, t3), "unused");
        assert!(set.get(TemplateRole::ServoDyn).is_none());
        assert!(matches!(
            set.get(TemplateRole::CoeffTable).map(|t| &t.body),
            Some(TemplateBody::Binary(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_names_role_and_path() {
        let dir = scratch("missing");
        let files = [(TemplateRole::HydroDyn, Some("HydroDyn.dat"))];
        let err = TemplateFileSet::load(&dir, files, None, None).unwrap_err();
        match err {
            FfError::MissingTemplate { role, path } => {
                assert_eq!(role, "hydrodyn");
                assert!(path.ends_with("HydroDyn.dat"));
            }
            other => panic!("unexpected error: {other}"),
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_token_is_rejected_at_load() {
        let dir = scratch("unknown");
        fs::write(dir.join("InflowWind.dat"), "RefHt {{ hub_heigth }}\n").unwrap();
        let files = [(TemplateRole::InflowWind, Some("InflowWind.dat"))];
        let err = TemplateFileSet::load(&dir, files, None, None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("hub_heigth"), "{msg}");
        assert!(msg.contains("InflowWind.dat"), "{msg}");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn colliding_outputs_are_a_write_error() {
        let dir = scratch("collide");
        fs::write(dir.join("Shared.dat"), "x\n").unwrap();
        let set = TemplateFileSet::load(
            &dir,
            [
                (TemplateRole::AeroDyn, Some("Shared.dat")),
                (TemplateRole::InflowWind, Some("Shared.dat")),
            ],
            None,
            None,
        )
        .unwrap();
        let err = set.check_output_names(&[TurbineId::new(0)], &[]).unwrap_err();
        assert!(matches!(err, FfError::Write { .. }));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn per_turbine_output_clashes_with_farm_file_of_a_later_turbine() {
        let dir = scratch("collide-turbine");
        fs::write(dir.join("ElastoDyn.T"), "x\n").unwrap();
        fs::write(dir.join("ElastoDyn_T1.dat"), "y\n").unwrap();
        let set = TemplateFileSet::load(
            &dir,
            [
                (TemplateRole::ElastoDyn, Some("ElastoDyn.T")),
                (TemplateRole::AeroDyn, Some("ElastoDyn_T1.dat")),
            ],
            None,
            None,
        )
        .unwrap();
        set.check_output_names(&[TurbineId::new(0)], &[]).unwrap();
        let err = set
            .check_output_names(&[TurbineId::new(0), TurbineId::new(1)], &[])
            .unwrap_err();
        assert!(err.to_string().contains("ElastoDyn_T1.dat"), "{err}");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn farm_file_may_not_shadow_the_job_script() {
        let dir = scratch("collide-script");
        fs::write(dir.join("runFASTFarm.sh"), "x\n").unwrap();
        let set = TemplateFileSet::load(
            &dir,
            [(TemplateRole::ControllerInput, Some("runFASTFarm.sh"))],
            None,
            None,
        )
        .unwrap();
        let err = set
            .check_output_names(&[TurbineId::new(0)], &["runFASTFarm.sh"])
            .unwrap_err();
        assert!(matches!(err, FfError::Write { .. }));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn role_keys_round_trip() {
        for role in TemplateRole::ALL {
            assert_eq!(TemplateRole::from_key(role.key()), Some(role));
        }
    }
}
