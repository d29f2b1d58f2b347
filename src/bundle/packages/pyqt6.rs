//! PyQt6 and its add-on packages.

use crate::bundle::asset::{Applies, AssetEntry, VersionedAsset};
use crate::bundle::package::{MsvcRuntime, PackageProfile};
use crate::core::{PlatformFamily::*, QtVersion};

const D: VersionedAsset = VersionedAsset::DEFAULT;

const QT_6_1: Option<QtVersion> = Some(QtVersion::new(6, 1, 0));
const QT_6_2: Option<QtVersion> = Some(QtVersion::new(6, 2, 0));
const QT_6_5: Option<QtVersion> = Some(QtVersion::new(6, 5, 0));
const QT_6_8: Option<QtVersion> = Some(QtVersion::new(6, 8, 0));

pub static PYQT6: PackageProfile = PackageProfile {
    name: "PyQt6",
    qt_major: 6,
    msvc_runtime: MsvcRuntime::PerArch,
    openssl: true,
    table: &[
        (
            "QtCore",
            AssetEntry::Single(VersionedAsset {
                other_lib_deps: &[(
                    Applies::Only(Linux),
                    &["libicui18n.so.56", "libicuuc.so.56", "libicudata.so.56"],
                )],
                translations: &["qt_help", "qtbase", "qtdeclarative", "qtquickcontrols2", "qt_"],
                excluded_plugins: Some(&["designer", "qmltooling"]),
                ..D
            }),
        ),
        ("QtDBus", AssetEntry::Single(D)),
        ("QtDesigner", AssetEntry::Single(D)),
        (
            "QtGui",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(Applies::Only(Linux), &["QtWaylandClient", "QtXcbQpa"])],
                other_lib_deps: &[(
                    Applies::Only(Windows),
                    &["d3dcompiler_47.dll", "opengl32sw.dll"],
                )],
                ..D
            }),
        ),
        ("QtHelp", AssetEntry::Single(D)),
        ("QtNetwork", AssetEntry::Single(D)),
        ("QtOpenGL", AssetEntry::Single(D)),
        ("QtOpenGLWidgets", AssetEntry::Single(D)),
        ("QtPrintSupport", AssetEntry::Single(D)),
        (
            "QtQml",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(Applies::All, &["QtQmlModels", "QtQmlWorkerScript"])],
                qml: true,
                ..D
            }),
        ),
        (
            "QtQuick",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(
                    Applies::All,
                    &[
                        "QtQuickControls2",
                        "QtQuickControls2Impl",
                        "QtQuickParticles",
                        "QtQuickShapes",
                        "QtQuickTemplates2",
                        "QtQuickTest",
                    ],
                )],
                qml: true,
                ..D
            }),
        ),
        (
            "QtQuick3D",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(
                    Applies::All,
                    &[
                        "QtQuick3DAssetImport",
                        "QtQuick3DRuntimeRender",
                        "QtQuick3DUtils",
                        "QtShaderTools",
                    ],
                )],
                qml: true,
                ..D
            }),
        ),
        ("QtQuickWidgets", AssetEntry::Single(D)),
        ("QtSql", AssetEntry::Single(D)),
        ("QtSvg", AssetEntry::Single(D)),
        ("QtSvgWidgets", AssetEntry::Single(D)),
        ("QtTest", AssetEntry::Single(VersionedAsset { qml: true, ..D })),
        ("QtWidgets", AssetEntry::Single(D)),
        ("QtXml", AssetEntry::Single(D)),
    ],
};

pub static PYQT6_WEBENGINE: PackageProfile = PackageProfile {
    name: "PyQt6_WebEngine",
    qt_major: 6,
    msvc_runtime: MsvcRuntime::None,
    openssl: false,
    table: &[
        (
            "QtWebEngineCore",
            AssetEntry::Single(VersionedAsset {
                version: QT_6_2,
                translations: &["qtwebengine"],
                other_lib_deps: &[(
                    Applies::Only(MacOs),
                    &["QtWebEngineCore.framework/Helpers/QtWebEngineProcess.app/Contents/Info.plist"],
                )],
                exes: &[
                    (Applies::Only(Linux), &["libexec/QtWebEngineProcess"]),
                    (
                        Applies::Only(MacOs),
                        &["lib/QtWebEngineCore.framework/Helpers/QtWebEngineProcess.app/Contents/MacOS/QtWebEngineProcess"],
                    ),
                    (Applies::Only(Windows), &["bin/QtWebEngineProcess.exe"]),
                ],
                files: &[(
                    Applies::Only(Windows),
                    &[("lib/Qt6Core.lib", "Enable QtWebEngineProcess to find its resources.\n")],
                )],
                others: &[
                    (Applies::Only(Linux), &["resources", "translations/qtwebengine_locales"]),
                    (Applies::Only(Windows), &["resources", "translations/qtwebengine_locales"]),
                ],
                ..D
            }),
        ),
        (
            "QtWebEngineQuick",
            AssetEntry::Single(VersionedAsset {
                version: QT_6_2,
                lib_deps: &[(Applies::All, &["QtWebEngineQuickDelegatesQml"])],
                qml: true,
                qml_names: Some(&["QtWebEngine"]),
                ..D
            }),
        ),
        ("QtWebEngineWidgets", AssetEntry::Single(VersionedAsset { version: QT_6_2, ..D })),
    ],
};

pub static PYQT6_3D: PackageProfile = PackageProfile {
    name: "PyQt6_3D",
    qt_major: 6,
    msvc_runtime: MsvcRuntime::None,
    openssl: false,
    table: &[
        (
            "Qt3DAnimation",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(Applies::All, &["Qt3DQuickAnimation"])],
                ..D
            }),
        ),
        (
            "Qt3DCore",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(Applies::All, &["QtConcurrent"])],
                qml: true,
                qml_names: Some(&["Qt3D"]),
                ..D
            }),
        ),
        (
            "Qt3DExtras",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(Applies::All, &["Qt3DQuickExtras"])],
                ..D
            }),
        ),
        (
            "Qt3DInput",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(Applies::All, &["Qt3DQuickInput"])],
                ..D
            }),
        ),
        ("Qt3DLogic", AssetEntry::Single(D)),
        (
            "Qt3DRender",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(Applies::All, &["Qt3DQuickRender", "Qt3DQuickScene2D"])],
                ..D
            }),
        ),
    ],
};

pub static PYQT6_CHARTS: PackageProfile = PackageProfile {
    name: "PyQt6_Charts",
    qt_major: 6,
    msvc_runtime: MsvcRuntime::None,
    openssl: false,
    table: &[(
        "QtCharts",
        AssetEntry::Variants(&[
            VersionedAsset {
                version: QT_6_5,
                lib_deps: &[(Applies::All, &["QtChartsQml"])],
                lgpl: false,
                ..D
            },
            VersionedAsset {
                version: QT_6_1,
                lgpl: false,
                ..D
            },
        ]),
    )],
};

pub static PYQT6_DATAVISUALIZATION: PackageProfile = PackageProfile {
    name: "PyQt6_DataVisualization",
    qt_major: 6,
    msvc_runtime: MsvcRuntime::None,
    openssl: false,
    table: &[(
        "QtDataVisualization",
        AssetEntry::Variants(&[
            VersionedAsset {
                version: QT_6_5,
                lib_deps: &[(Applies::All, &["QtDataVisualizationQml"])],
                qml: true,
                lgpl: false,
                ..D
            },
            VersionedAsset {
                version: QT_6_1,
                qml: true,
                lgpl: false,
                ..D
            },
        ]),
    )],
};

pub static PYQT6_GRAPHS: PackageProfile = PackageProfile {
    name: "PyQt6_Graphs",
    qt_major: 6,
    msvc_runtime: MsvcRuntime::None,
    openssl: false,
    table: &[
        (
            "QtGraphs",
            AssetEntry::Single(VersionedAsset {
                version: QT_6_8,
                lgpl: false,
                ..D
            }),
        ),
        (
            "QtGraphsWidgets",
            AssetEntry::Single(VersionedAsset {
                version: QT_6_8,
                lgpl: false,
                ..D
            }),
        ),
    ],
};
